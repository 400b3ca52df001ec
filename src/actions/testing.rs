//! Helpers for action unit tests.

use std::sync::Arc;

use axum::http::Request;

use crate::actions::{PathParams, RequestContext};
use crate::app::AppContext;
use crate::config::HorizonConfig;
use crate::data::{InMemoryLedgerSource, Ledger};
use crate::lifecycle::Shutdown;
use crate::observability::MetricsRegistry;

pub fn app(source: Arc<InMemoryLedgerSource>) -> Arc<AppContext> {
    app_with_config(HorizonConfig::default(), source)
}

pub fn app_with_config(config: HorizonConfig, source: Arc<InMemoryLedgerSource>) -> Arc<AppContext> {
    Arc::new(AppContext::new(
        config,
        source,
        MetricsRegistry::new(),
        Shutdown::new(),
    ))
}

pub fn context_with(
    app: Arc<AppContext>,
    uri: &str,
    params: &[(&str, &str)],
) -> RequestContext {
    let (parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
    let mut path = PathParams::new();
    for (name, value) in params {
        path.push(*name, *value);
    }
    RequestContext::new(&parts, path, app)
}

pub fn context(uri: &str, params: &[(&str, &str)]) -> RequestContext {
    context_with(app(Arc::new(InMemoryLedgerSource::new())), uri, params)
}

pub fn ledger(sequence: u32) -> Ledger {
    Ledger {
        sequence,
        hash: format!("{:064x}", sequence),
        prev_hash: sequence.checked_sub(1).map(|prev| format!("{:064x}", prev)),
        transaction_count: 1,
        operation_count: 2,
        closed_at: 1_700_000_000 + u64::from(sequence) * 5,
    }
}
