//! Shared application dependencies.

use std::sync::Arc;

use crate::config::HorizonConfig;
use crate::data::LedgerSource;
use crate::lifecycle::Shutdown;
use crate::observability::MetricsRegistry;
use crate::security::RateLimiter;

/// Read-only dependencies attached to every request by the
/// application-context middleware stage.
pub struct AppContext {
    config: HorizonConfig,
    source: Arc<dyn LedgerSource>,
    metrics: MetricsRegistry,
    rate_limiter: Option<RateLimiter>,
    shutdown: Shutdown,
}

impl AppContext {
    pub fn new(
        config: HorizonConfig,
        source: Arc<dyn LedgerSource>,
        metrics: MetricsRegistry,
        shutdown: Shutdown,
    ) -> Self {
        let rate_limiter = RateLimiter::from_config(&config.rate_limit);
        Self {
            config,
            source,
            metrics,
            rate_limiter,
            shutdown,
        }
    }

    pub fn config(&self) -> &HorizonConfig {
        &self.config
    }

    pub fn source(&self) -> &dyn LedgerSource {
        self.source.as_ref()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Whether `client` is over its request budget. Always false when
    /// throttling is disabled.
    pub fn is_throttled(&self, client: &str) -> bool {
        self.rate_limiter
            .as_ref()
            .is_some_and(|limiter| !limiter.check(client))
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Convenience alias for the handle stored in request extensions.
pub type SharedApp = Arc<AppContext>;
