//! Instrumented sample work service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod traffic;
pub mod work;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Telemetry;
