//! The work unit: delay, outcome, and its telemetry.

use std::time::Duration;

use opentelemetry::trace::{Span, Status, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::Tracer;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::work::injector::{FailureInjector, WorkProfile};
use crate::work::result::WorkResult;

pub const WORK_PATH: &str = "/work";
pub const WORK_METHOD: &str = "GET";
pub const WORK_SPAN: &str = "work-span";
/// Log event name of the per-request record.
pub const WORK_EVENT: &str = "handled_work";

const STATUS_OK: u16 = 200;
const STATUS_FAILED: u16 = 500;

/// Runs simulated units of work. Shared by all requests.
pub struct WorkHandler {
    profile: WorkProfile,
    injector: FailureInjector,
    tracer: Tracer,
}

impl WorkHandler {
    pub fn new(profile: WorkProfile, injector: FailureInjector, tracer: Tracer) -> Self {
        Self {
            profile,
            injector,
            tracer,
        }
    }

    /// Run one unit of work under `parent`.
    ///
    /// Metric, log line and span are emitted on every call, whatever the
    /// simulated outcome.
    pub async fn run(&self, parent: &Context, fail: bool) -> WorkResult {
        let start = Instant::now();
        // Ended explicitly below; the SDK span also ends on drop.
        let mut span = self.tracer.start_with_context(WORK_SPAN, parent);
        let trace_id = span.span_context().trace_id().to_string();

        let delay = self.injector.sample_delay(&self.profile);
        span.set_attribute(KeyValue::new("work.delay_seconds", delay));
        span.set_attribute(KeyValue::new("work.fail_requested", fail));
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;

        let failed = fail && self.injector.roll_failure(self.profile.failure_rate);
        let status = if failed { STATUS_FAILED } else { STATUS_OK };

        let elapsed = start.elapsed();
        metrics::record_request(WORK_METHOD, WORK_PATH, status, elapsed);

        let result = WorkResult {
            duration: elapsed.as_secs_f64(),
            status,
            delay,
            trace_id,
            failed,
        };

        tracing::info!(
            event = WORK_EVENT,
            path = WORK_PATH,
            method = WORK_METHOD,
            trace_id = %result.trace_id,
            duration_ms = result.duration_ms(),
            status = result.status
        );

        span.set_attribute(KeyValue::new("http.response.status_code", i64::from(status)));
        if failed {
            span.set_status(Status::error("simulated failure"));
        }
        span.end();

        result
    }
}
