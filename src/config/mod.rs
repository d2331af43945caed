//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, or defaults)
//!     → environment overrides (OTEL_SERVICE_NAME, OTEL_EXPORTER_OTLP_ENDPOINT, ...)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Environment beats file, matching OpenTelemetry conventions

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve, ConfigError};
pub use schema::{AppConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig, WorkConfig};
