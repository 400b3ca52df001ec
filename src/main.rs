//! Horizon ledger API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum::serve)
//!                        │
//!                        ▼
//!                  middleware chain
//!     request-id → access-log → recoverer → automatic-options
//!                → app-context → metrics → cors
//!                        │
//!                        ▼
//!                  routing::Router ──▶ ActionFactory
//!                        │
//!                        ▼
//!                  actions::dispatch
//!               prepare → execute → respond
//!                        │
//!                        ▼
//!                  data::LedgerSource
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;

use horizon::config::{self, HorizonConfig};
use horizon::data::{InMemoryLedgerSource, Ledger};
use horizon::lifecycle::{signals, startup, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "horizon")]
#[command(about = "Read-only HTTP API over ledger history", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Close a synthetic ledger every N seconds (development only).
    #[arg(long, value_name = "SECS")]
    simulate: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => HorizonConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    startup::init_observability(&config)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "horizon starting");

    let source = Arc::new(InMemoryLedgerSource::new());
    let shutdown = Shutdown::new();

    if let Some(secs) = args.simulate.filter(|secs| *secs > 0) {
        tokio::spawn(simulate_ledgers(
            source.clone(),
            Duration::from_secs(secs),
            shutdown.clone(),
        ));
    }

    let (server, listener) = startup::prepare(config, source, shutdown.clone()).await?;

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn simulate_ledgers(source: Arc<InMemoryLedgerSource>, every: Duration, shutdown: Shutdown) {
    let mut stop = shutdown.subscribe();
    let mut ticker = tokio::time::interval(every);
    let mut prev_hash: Option<String> = None;

    for sequence in 1u32.. {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop.recv() => return,
        }

        let closed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let hash = format!("{:064x}", u64::from(sequence) ^ closed_at);

        source.close_ledger(Ledger {
            sequence,
            hash: hash.clone(),
            prev_hash: prev_hash.replace(hash),
            transaction_count: 0,
            operation_count: 0,
            closed_at,
        });
        tracing::debug!(sequence, "Closed synthetic ledger");
    }
}
