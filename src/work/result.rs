//! Outcome of one simulated unit of work.

use std::time::Duration;

/// Everything the handler learned while running one unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkResult {
    /// Wall-clock time from start to just before the response, in seconds.
    pub duration: f64,
    /// HTTP status the request answers with.
    pub status: u16,
    /// Simulated processing time, in seconds.
    pub delay: f64,
    /// Trace id of the work span, 32 lowercase hex characters.
    pub trace_id: String,
    /// Whether the injected failure fired.
    pub failed: bool,
}

impl WorkResult {
    /// Duration in whole milliseconds, as logged.
    pub fn duration_ms(&self) -> u64 {
        Duration::from_secs_f64(self.duration).as_millis() as u64
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
