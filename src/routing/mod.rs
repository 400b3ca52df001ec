//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route lookup, HEAD treated as GET)
//!     → matcher.rs (segment match, parameter extraction)
//!     → Return: ActionFactory + PathParams (NotFound factory on no match)
//!
//! Route Compilation (at startup):
//!     routes.rs install_actions(RoutesConfig)
//!     → Parse patterns, reject duplicates
//!     → Freeze as immutable Router behind an Arc
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: literal segments outrank parameters, left to right

pub mod matcher;
pub mod router;
pub mod routes;

pub use router::{RouteError, RouteMatch, Router};
pub use routes::install_actions;
