//! Read-only HTTP API over ledger history.
//!
//! Requests pass a fixed middleware chain, resolve to an action through the
//! route table, and run the action's prepare/execute lifecycle.

// Core subsystems
pub mod actions;
pub mod config;
pub mod http;
pub mod routing;

// Collaborators
pub mod app;
pub mod data;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use app::AppContext;
pub use config::HorizonConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
