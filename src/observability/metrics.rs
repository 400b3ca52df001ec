//! Request metrics.
//!
//! # Responsibilities
//! - Hold the process-wide request timer and outcome meters
//! - Render snapshots for the metrics-report action
//! - Mirror every sample to the `metrics` facade for Prometheus scraping
//!
//! # Metrics
//! - `requests.total` (timer): count and latency distribution
//! - `requests.succeeded` (meter): completed without an error status
//! - `requests.failed` (meter): error status, panic or failed stream
//!
//! # Design Decisions
//! - The registry is a cheap cloneable handle injected through the
//!   application context, never a global; tests get a fresh one each
//! - Counters are atomics; the latency reservoir sits behind a mutex
//! - A request is recorded exactly once, when its `RequestTimer` drops

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use serde::Serialize;

pub const REQUESTS_TOTAL: &str = "requests.total";
pub const REQUESTS_SUCCEEDED: &str = "requests.succeeded";
pub const REQUESTS_FAILED: &str = "requests.failed";

/// Latency samples kept for percentile estimates.
const RESERVOIR_SIZE: usize = 1028;

/// Final attribution of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl Outcome {
    /// Client and server error statuses count as failures.
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_client_error() || status.is_server_error() {
            Outcome::Failed
        } else {
            Outcome::Succeeded
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Default)]
struct Meter {
    count: AtomicU64,
}

impl Meter {
    fn mark(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, uptime: Duration) -> MeterSnapshot {
        let count = self.count.load(Ordering::Relaxed);
        MeterSnapshot {
            count,
            mean_rate: mean_rate(count, uptime),
        }
    }
}

#[derive(Debug, Default)]
struct Timer {
    count: AtomicU64,
    /// Most recent durations in microseconds.
    samples: Mutex<VecDeque<u64>>,
}

impl Timer {
    fn update(&self, elapsed: Duration) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        if samples.len() == RESERVOIR_SIZE {
            samples.pop_front();
        }
        samples.push_back(micros);
    }

    fn snapshot(&self, uptime: Duration) -> TimerSnapshot {
        let count = self.count.load(Ordering::Relaxed);
        let mut sorted: Vec<u64> = self
            .samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        sorted.sort_unstable();

        let ms = |micros: u64| micros as f64 / 1000.0;
        let mean = if sorted.is_empty() {
            0.0
        } else {
            ms(sorted.iter().sum::<u64>()) / sorted.len() as f64
        };

        TimerSnapshot {
            count,
            mean_rate: mean_rate(count, uptime),
            min: sorted.first().copied().map(ms).unwrap_or(0.0),
            max: sorted.last().copied().map(ms).unwrap_or(0.0),
            mean,
            p50: ms(percentile(&sorted, 0.50)),
            p75: ms(percentile(&sorted, 0.75)),
            p95: ms(percentile(&sorted, 0.95)),
            p99: ms(percentile(&sorted, 0.99)),
        }
    }
}

/// Nearest-rank percentile over sorted samples.
fn percentile(sorted: &[u64], quantile: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn mean_rate(count: u64, uptime: Duration) -> f64 {
    let secs = uptime.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

/// Rates are events per second; durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub count: u64,
    pub mean_rate: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterSnapshot {
    pub count: u64,
    pub mean_rate: f64,
}

/// Point-in-time view of the registry, keyed by metric name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    #[serde(rename = "requests.total")]
    pub total: TimerSnapshot,
    #[serde(rename = "requests.succeeded")]
    pub succeeded: MeterSnapshot,
    #[serde(rename = "requests.failed")]
    pub failed: MeterSnapshot,
}

#[derive(Debug)]
struct Registry {
    started: Instant,
    total: Timer,
    succeeded: Meter,
    failed: Meter,
}

/// Shared handle to the request metrics.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    inner: Arc<Registry>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Registry {
                started: Instant::now(),
                total: Timer::default(),
                succeeded: Meter::default(),
                failed: Meter::default(),
            }),
        }
    }

    /// Start timing a request. The sample is recorded when the timer drops.
    pub fn start_request(&self) -> RequestTimer {
        RequestTimer {
            registry: self.clone(),
            started: Instant::now(),
            outcome: None,
        }
    }

    /// Record one finished request.
    pub fn record(&self, elapsed: Duration, outcome: Outcome) {
        self.inner.total.update(elapsed);
        match outcome {
            Outcome::Succeeded => self.inner.succeeded.mark(),
            Outcome::Failed => self.inner.failed.mark(),
        }

        metrics::counter!("horizon_requests_total", "outcome" => outcome.as_str()).increment(1);
        metrics::histogram!("horizon_request_duration_seconds").record(elapsed.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let uptime = self.inner.started.elapsed();
        MetricsSnapshot {
            total: self.inner.total.snapshot(uptime),
            succeeded: self.inner.succeeded.snapshot(uptime),
            failed: self.inner.failed.snapshot(uptime),
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Times one request and books its outcome on drop.
///
/// A timer dropped without a settled outcome (the request unwound through a
/// panic) is booked as failed.
#[derive(Debug)]
pub struct RequestTimer {
    registry: MetricsRegistry,
    started: Instant,
    outcome: Option<Outcome>,
}

impl RequestTimer {
    pub fn settle(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let outcome = self.outcome.unwrap_or(Outcome::Failed);
        self.registry.record(self.started.elapsed(), outcome);
    }
}

/// Install the Prometheus exporter as the global `metrics` recorder.
pub fn init_prometheus(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_timer_records_once() {
        let registry = MetricsRegistry::new();
        {
            let mut timer = registry.start_request();
            timer.settle(Outcome::Succeeded);
        }
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.total.count, 1);
        assert_eq!(snapshot.succeeded.count, 1);
        assert_eq!(snapshot.failed.count, 0);
    }

    #[test]
    fn unsettled_timer_counts_as_failure() {
        let registry = MetricsRegistry::new();
        drop(registry.start_request());
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.total.count, 1);
        assert_eq!(snapshot.failed.count, 1);
    }

    #[test]
    fn timer_survives_unwinding() {
        let registry = MetricsRegistry::new();
        let handle = registry.clone();
        let result = std::panic::catch_unwind(move || {
            let _timer = handle.start_request();
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(registry.snapshot().failed.count, 1);
    }

    #[test]
    fn percentiles_use_nearest_rank() {
        let registry = MetricsRegistry::new();
        for ms in 1..=100u64 {
            registry.record(Duration::from_millis(ms), Outcome::Succeeded);
        }
        let total = registry.snapshot().total;
        assert_eq!(total.count, 100);
        assert_eq!(total.min, 1.0);
        assert_eq!(total.max, 100.0);
        assert_eq!(total.p50, 50.0);
        assert_eq!(total.p95, 95.0);
        assert_eq!(total.p99, 99.0);
        assert!((total.mean - 50.5).abs() < f64::EPSILON);
    }

    #[test]
    fn reservoir_is_bounded() {
        let registry = MetricsRegistry::new();
        for _ in 0..(RESERVOIR_SIZE + 10) {
            registry.record(Duration::from_millis(1), Outcome::Failed);
        }
        let samples = registry.inner.total.samples.lock().unwrap().len();
        assert_eq!(samples, RESERVOIR_SIZE);
        assert_eq!(registry.snapshot().total.count as usize, RESERVOIR_SIZE + 10);
    }

    #[test]
    fn status_classification() {
        assert_eq!(Outcome::from_status(StatusCode::OK), Outcome::Succeeded);
        assert_eq!(Outcome::from_status(StatusCode::NOT_MODIFIED), Outcome::Succeeded);
        assert_eq!(Outcome::from_status(StatusCode::NOT_FOUND), Outcome::Failed);
        assert_eq!(Outcome::from_status(StatusCode::NOT_IMPLEMENTED), Outcome::Failed);
    }

    #[test]
    fn snapshot_uses_metric_names() {
        let value = serde_json::to_value(MetricsRegistry::new().snapshot()).unwrap();
        assert!(value.get(REQUESTS_TOTAL).is_some());
        assert!(value.get(REQUESTS_SUCCEEDED).is_some());
        assert!(value.get(REQUESTS_FAILED).is_some());
    }
}
