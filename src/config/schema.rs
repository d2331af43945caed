//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default, so an empty file (or no file) is a valid config.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging, metrics and trace export settings.
    pub observability: ObservabilityConfig,

    /// Shape of the simulated work unit.
    pub work: WorkConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service identity stamped on log lines and trace resources.
    pub service_name: String,

    /// OTLP/HTTP collector base URL. Spans go to `<endpoint>/v1/traces`.
    pub otlp_endpoint: String,

    /// Export spans to the collector. When off, spans are still created
    /// (trace ids stay valid for log correlation) but never shipped.
    pub tracing_enabled: bool,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// One JSON object per line instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "sample-app".to_string(),
            otlp_endpoint: "http://jaeger:4318".to_string(),
            tracing_enabled: true,
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

/// Simulated work settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkConfig {
    /// Lower bound of the simulated delay, in seconds.
    pub min_delay_secs: f64,

    /// Upper bound of the simulated delay, in seconds.
    pub max_delay_secs: f64,

    /// Probability that a `fail=true` request answers 500.
    pub failure_rate: f64,

    /// Seed for the failure/delay random source. Unset means OS entropy.
    pub seed: Option<u64>,
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: 0.01,
            max_delay_secs: 0.5,
            failure_rate: 0.3,
            seed: None,
        }
    }
}
