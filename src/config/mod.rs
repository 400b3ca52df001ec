//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HorizonConfig (validated, immutable)
//!     → shared via Arc<AppContext> to every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table is built from it once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HorizonConfig, ListenerConfig, LogFormat, NetworkConfig, ObservabilityConfig, RateLimitConfig,
    RoutesConfig, StreamingConfig,
};
