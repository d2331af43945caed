//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) and echo it back
//! - Open the server span and hand its context to handlers explicitly
//! - Parse `/work` query parameters
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Trace context travels in request extensions as a value, never as
//!   ambient state

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use serde::{de, Deserialize, Deserializer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::http::server::AppState;
use crate::observability::tracing::extract_parent;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that assigns `x-request-id` when the client did not send one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer that copies `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Trace context of the request's server span.
#[derive(Clone, Debug)]
pub struct RequestTrace(pub Context);

impl RequestTrace {
    pub fn context(&self) -> &Context {
        &self.0
    }
}

/// Middleware opening a server span per routed request.
pub async fn server_span(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let parent = extract_parent(request.headers());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let span = state
        .tracer
        .span_builder(format!("{method} {route}"))
        .with_kind(SpanKind::Server)
        .with_attributes([
            KeyValue::new("http.request.method", method),
            KeyValue::new("http.route", route),
            KeyValue::new("url.path", path),
        ])
        .start_with_context(&state.tracer, &parent);
    let cx = parent.with_span(span);

    request.extensions_mut().insert(RequestTrace(cx.clone()));
    let response = next.run(request).await;

    let status = response.status();
    let span = cx.span();
    span.set_attribute(KeyValue::new("http.response.status_code", i64::from(status.as_u16())));
    if status.is_server_error() {
        span.set_status(Status::error(status.to_string()));
    }
    span.end();

    response
}

/// Query parameters of `GET /work`.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct WorkParams {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub fail: bool,
}

/// Accepts the boolean spellings clients commonly send (`True`, `1`, `yes`, ...).
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_bool(&raw).ok_or_else(|| {
        de::Error::custom(format!("value '{raw}' could not be parsed to a boolean"))
    })
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
