//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! The work handler produces, per request:
//!     → logging.rs (one structured JSON log line)
//!     → metrics.rs (histogram observation + counter increment)
//!     → tracing.rs (work span, child of the request's server span)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape of /metrics)
//!     → Distributed tracing (OTLP/HTTP, e.g. Jaeger)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Trace id flows into every work log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod tracing;

use metrics_exporter_prometheus::PrometheusHandle;
use opentelemetry_sdk::trace::Tracer;

/// Errors raised while bringing up telemetry at startup.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("histogram bucket configuration rejected: {0}")]
    Buckets(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to install metrics recorder: {0}")]
    Recorder(String),

    #[error("metrics registry lock poisoned")]
    RegistryPoisoned,

    #[error("failed to build span exporter: {0}")]
    Exporter(String),
}

/// Handles the HTTP layer needs from the telemetry stack.
#[derive(Clone)]
pub struct Telemetry {
    pub metrics: PrometheusHandle,
    pub tracer: Tracer,
}
