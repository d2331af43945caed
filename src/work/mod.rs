//! Simulated work subsystem.
//!
//! # Data Flow
//! ```text
//! GET /work?fail=<bool>
//!     → handler.rs (open work span under the request context)
//!     → injector.rs (sample delay, roll failure)
//!     → sleep, then metric + log line + span end
//!     → result.rs (WorkResult, mapped to the HTTP response)
//! ```
//!
//! # Design Decisions
//! - Trace context and randomness are injected, never global
//! - Failure is simulated: a 500 is an outcome, not an error path

pub mod handler;
pub mod injector;
pub mod result;

pub use handler::WorkHandler;
pub use injector::{FailureInjector, WorkProfile};
pub use result::WorkResult;
