//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and addresses.
//! Every problem is reported, not just the first one.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::HorizonConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HorizonConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.streaming.keep_alive_secs == 0 {
        errors.push(ValidationError::new("streaming.keep_alive_secs", "must be positive"));
    }
    if config.streaming.max_lifetime_secs == 0 {
        errors.push(ValidationError::new("streaming.max_lifetime_secs", "must be positive"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_second == 0 {
            errors.push(ValidationError::new("rate_limit.requests_per_second", "must be positive"));
        }
        if config.rate_limit.burst_size == 0 {
            errors.push(ValidationError::new("rate_limit.burst_size", "must be positive"));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
