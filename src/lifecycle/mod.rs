//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight requests drain
//!             → metrics upkeep stops → spans flushed → exit
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain, flush telemetry
//! - One broadcast channel reaches every long-running task

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
