//! Distributed tracing support.
//!
//! Spans are built with the OpenTelemetry SDK and shipped by a batch span
//! processor to an OTLP/HTTP collector (Jaeger, Tempo, ...).
//!
//! # Design Decisions
//! - Trace context is passed explicitly as an `opentelemetry::Context`
//!   value; nothing reads an ambient "current span"
//! - Incoming W3C `traceparent` headers parent the server span
//! - With export disabled the provider still mints real ids so log lines
//!   stay correlatable

use axum::http::HeaderMap;
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{Context, KeyValue};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};

use crate::config::ObservabilityConfig;
use crate::observability::TelemetryError;

/// Instrumentation scope name for spans created by this crate.
pub const INSTRUMENTATION_SCOPE: &str = "sample_app";

/// Signal path appended to the collector base URL.
const TRACES_PATH: &str = "/v1/traces";

/// Full OTLP/HTTP traces URL for a collector base endpoint.
pub fn traces_endpoint(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), TRACES_PATH)
}

fn resource(service_name: &str) -> Resource {
    Resource::new([
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ])
}

/// Build the tracer provider described by `config`.
///
/// Must be called from within a Tokio runtime when export is enabled: the
/// batch processor runs on it.
pub fn init_tracer_provider(config: &ObservabilityConfig) -> Result<TracerProvider, TelemetryError> {
    if !config.tracing_enabled {
        tracing::info!("Trace export disabled");
        return Ok(in_process_provider(&config.service_name));
    }

    let endpoint = traces_endpoint(&config.otlp_endpoint);
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint.clone())
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let provider = TracerProvider::builder()
        .with_resource(resource(&config.service_name))
        .with_batch_exporter(exporter, runtime::Tokio)
        .build();

    tracing::info!(endpoint = %endpoint, service = %config.service_name, "OTLP trace export enabled");
    Ok(provider)
}

/// A provider that creates and samples spans but exports nothing.
pub fn in_process_provider(service_name: &str) -> TracerProvider {
    TracerProvider::builder()
        .with_resource(resource(service_name))
        .build()
}

/// Tracer for this crate's spans.
pub fn tracer(provider: &TracerProvider) -> Tracer {
    provider.tracer(INSTRUMENTATION_SCOPE)
}

/// Flush pending spans and stop the batch processor.
pub fn shutdown_provider(provider: &TracerProvider) {
    if let Err(e) = provider.shutdown() {
        tracing::warn!(error = %e, "Trace provider shutdown failed");
    }
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Parent context from W3C trace-context headers; empty when absent or
/// malformed.
pub fn extract_parent(headers: &HeaderMap) -> Context {
    TraceContextPropagator::new().extract(&HeaderExtractor(headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use opentelemetry::trace::{Span, TraceContextExt, Tracer as _};

    #[test]
    fn test_traces_endpoint() {
        assert_eq!(traces_endpoint("http://jaeger:4318"), "http://jaeger:4318/v1/traces");
        assert_eq!(traces_endpoint("http://jaeger:4318/"), "http://jaeger:4318/v1/traces");
    }

    #[test]
    fn test_extract_parent_from_traceparent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "traceparent",
            HeaderValue::from_static("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        );

        let parent = extract_parent(&headers);
        let provider = in_process_provider("test");
        let span = tracer(&provider).start_with_context("child", &parent);

        assert_eq!(
            span.span_context().trace_id().to_string(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );
    }

    #[test]
    fn test_missing_header_gives_fresh_root() {
        let parent = extract_parent(&HeaderMap::new());
        assert!(!parent.span().span_context().is_valid());

        let provider = in_process_provider("test");
        let span = tracer(&provider).start_with_context("root", &parent);
        let id = span.span_context().trace_id().to_string();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }
}
