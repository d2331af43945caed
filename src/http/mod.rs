//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, server span, query parsing)
//!     → handler (/healthz, /metrics, /work)
//!     → response.rs (status and body for the outcome)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestTrace, WorkParams, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
