//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve, connect info, graceful shutdown)
//!     → middleware/ (request id → access log → recoverer → options
//!                    → app context → metrics → cors)
//!     → server.rs dispatch_request (route lookup, throttling)
//!     → actions::dispatch
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::{MiddlewareChain, Stage};
pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
