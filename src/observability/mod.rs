//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → access log line (http/middleware/access_log.rs, TraceLayer)
//!     → one RequestTimer sample (metrics.rs)
//!
//! Consumers:
//!     → stdout (pretty or JSON, logging.rs)
//!     → GET /metrics (registry snapshot)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is a field of the request span, so every log line carries it
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use metrics::{MetricsRegistry, MetricsSnapshot, Outcome, RequestTimer};
