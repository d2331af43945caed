//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, path, status
//! - `http_request_duration_seconds` (histogram): work unit latency
//!
//! # Design Decisions
//! - One process-wide Prometheus recorder, installed once, never torn down
//! - Updates go through the `metrics` macros (atomic, lock-free)
//! - Exposition is served by the application's own `/metrics` route

use std::sync::Mutex;
use std::time::Duration;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::observability::TelemetryError;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Prometheus text exposition content type.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Latency buckets, 5ms to 5s.
pub const DURATION_BUCKETS: [f64; 10] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0];

static REGISTRY: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the global recorder, or return the handle of the one already
/// installed. Safe to call from several places (tests included).
pub fn install() -> Result<PrometheusHandle, TelemetryError> {
    let mut registry = REGISTRY.lock().map_err(|_| TelemetryError::RegistryPoisoned)?;
    if let Some(handle) = registry.as_ref() {
        return Ok(handle.clone());
    }

    let recorder = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION_SECONDS.to_string()), &DURATION_BUCKETS)?
        .build_recorder();
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::Recorder(e.to_string()))?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Total HTTP requests");
    metrics::describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Request latency"
    );

    tracing::info!("Prometheus recorder installed");
    *registry = Some(handle.clone());
    Ok(handle)
}

/// Record one handled request: a latency observation and a counter bump.
pub fn record_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    metrics::histogram!(REQUEST_DURATION_SECONDS).record(elapsed.as_secs_f64());
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Read a counter value for the given label set out of a rendered scrape.
/// Series without labels (such as a histogram's `_count`) match an empty
/// label set. Returns 0 when the series has not been emitted yet.
pub fn scrape_counter(exposition: &str, name: &str, labels: &[(&str, &str)]) -> f64 {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let rest = series.strip_prefix(name)?;
            let matches = (rest.is_empty() && labels.is_empty())
                || (rest.starts_with('{')
                    && labels
                        .iter()
                        .all(|(k, v)| rest.contains(&format!("{k}=\"{v}\""))));
            if matches {
                value.parse::<f64>().ok()
            } else {
                None
            }
        })
        .sum()
}
