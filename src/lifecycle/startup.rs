//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging and the optional Prometheus exporter
//! - Build the server from a validated configuration
//! - Bind the listener last, so traffic arrives only when ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::HorizonConfig;
use crate::data::LedgerSource;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};
use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start the Prometheus exporter: {0}")]
    Exporter(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Install the tracing subscriber and, when enabled, the metrics exporter.
pub fn init_observability(config: &HorizonConfig) -> Result<(), StartupError> {
    logging::init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(address.clone()))?;
        metrics::init_prometheus(addr)?;
    }
    Ok(())
}

/// Build the server and bind its listener.
pub async fn prepare(
    config: HorizonConfig,
    source: Arc<dyn LedgerSource>,
    shutdown: Shutdown,
) -> Result<(HttpServer, TcpListener), StartupError> {
    let address = config.listener.bind_address.clone();
    tracing::info!(
        bind_address = %address,
        experimental_routes = config.routes.experimental,
        rate_limit = config.rate_limit.enabled,
        "Configuration loaded"
    );

    let server = HttpServer::new(config, source, shutdown)?;
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;
    Ok((server, listener))
}
