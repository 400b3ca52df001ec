//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Route resolution (http/server.rs):
//!     → rate_limit.rs (per-client token bucket)
//!     → allowed: matched action
//!     → denied: rate-limit-exceeded action
//! ```
//!
//! # Design Decisions
//! - Throttling is decided before dispatch, never inside an action
//! - Buckets are keyed by client IP
//! - Disabled by default

pub mod rate_limit;

pub use rate_limit::RateLimiter;
