//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     logging → metrics exporter → route table + AppContext → bind listener
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → open streams end → drain → exit
//! ```
//!
//! # Design Decisions
//! - One watch channel; every long-running task subscribes, and a task that
//!   subscribes after the trigger still sees it
//! - Streams subscribe too, otherwise graceful shutdown would wait on them forever

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::StartupError;
