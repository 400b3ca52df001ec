//! The fixed middleware chain.
//!
//! # Data Flow
//! ```text
//! Request
//!     → RequestId         fresh id in extensions and x-request-id
//!     → AccessLog         span + status/latency line
//!     → Recoverer         panic → 500 problem
//!     → AutomaticOptions  OPTIONS answered (and timed) from the route table
//!     → AppContext        Arc<AppContext> in extensions
//!     → Metrics           RequestTimer around the inner chain
//!     → Cors              `*` origin
//!     → dispatcher
//! ```
//!
//! # Design Decisions
//! - The order is data (`MiddlewareChain`), built once and identical for
//!   every route
//! - Stages never inspect which action runs

pub mod access_log;
pub mod app_context;
pub mod cors;
pub mod metrics;
pub mod options;
pub mod recoverer;

use std::fmt;
use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};

use crate::app::SharedApp;
use crate::http::request::RequestIdLayer;
use crate::routing::Router as ActionRouter;

/// One interceptor in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RequestId,
    AccessLog,
    Recoverer,
    AutomaticOptions,
    AppContext,
    Metrics,
    Cors,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RequestId => "request-id",
            Stage::AccessLog => "access-log",
            Stage::Recoverer => "recoverer",
            Stage::AutomaticOptions => "automatic-options",
            Stage::AppContext => "app-context",
            Stage::Metrics => "metrics",
            Stage::Cors => "cors",
        };
        f.write_str(name)
    }
}

/// Ordered stages, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewareChain {
    stages: Vec<Stage>,
}

impl MiddlewareChain {
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Stage::RequestId,
                Stage::AccessLog,
                Stage::Recoverer,
                Stage::AutomaticOptions,
                Stage::AppContext,
                Stage::Metrics,
                Stage::Cors,
            ],
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Wrap `router` in every stage.
    ///
    /// `Router::layer` makes the most recent layer the outermost, so stages
    /// are applied innermost first.
    pub fn apply(
        &self,
        router: axum::Router,
        routes: Arc<ActionRouter>,
        app: SharedApp,
    ) -> axum::Router {
        self.stages.iter().rev().fold(router, |router, stage| {
            tracing::trace!(stage = %stage, "Applying middleware stage");
            match stage {
                Stage::RequestId => router.layer(RequestIdLayer),
                Stage::AccessLog => router.layer(access_log::layer()),
                Stage::Recoverer => router
                    .layer(recoverer::layer())
                    .layer(from_fn(recoverer::attach_request_id)),
                Stage::AutomaticOptions => router.layer(from_fn_with_state(
                    (routes.clone(), app.clone()),
                    options::automatic_options,
                )),
                Stage::AppContext => {
                    router.layer(from_fn_with_state(app.clone(), app_context::inject))
                }
                Stage::Metrics => router.layer(from_fn(metrics::record)),
                Stage::Cors => router.layer(cors::layer()),
            }
        })
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::standard()
    }
}
