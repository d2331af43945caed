//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and that
//! addresses and URLs parse. All problems are reported, not just the first.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration, returning every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    let obs = &config.observability;
    if obs.service_name.trim().is_empty() {
        errors.push(ValidationError::new("observability.service_name", "must not be empty"));
    }
    match Url::parse(&obs.otlp_endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "observability.otlp_endpoint",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "observability.otlp_endpoint",
            format!("'{}' is not a URL: {}", obs.otlp_endpoint, e),
        )),
    }

    let work = &config.work;
    // NaN fails every comparison below, so it is rejected too.
    if !(work.min_delay_secs > 0.0) {
        errors.push(ValidationError::new("work.min_delay_secs", "must be > 0"));
    }
    if !(work.max_delay_secs >= work.min_delay_secs) {
        errors.push(ValidationError::new(
            "work.max_delay_secs",
            "must be >= work.min_delay_secs",
        ));
    }
    if !(0.0..=1.0).contains(&work.failure_rate) {
        errors.push(ValidationError::new("work.failure_rate", "must be within [0, 1]"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
