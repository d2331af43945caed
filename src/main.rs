//! Instrumented sample work service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ request id ─▶ server span ─▶ router            │
//!                              │                                  │               │
//!                              │        /healthz   /metrics   /work               │
//!                              │                      │          │                │
//!                              │                      │          ▼                │
//!                              │                      │    work handler           │
//!                              │                      │    delay, outcome         │
//!                              │                      │      │     │     │        │
//!                              │                      ▼      ▼     ▼     ▼        │
//!                              │              Prometheus ◀─ metric  log  span ─▶ OTLP
//!                              │               registry          │                │
//!                              │                              stdout (JSON)       │
//!                              └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use sample_app::config;
use sample_app::lifecycle::{wait_for_signal, Shutdown};
use sample_app::observability::{logging, metrics, tracing as otel};
use sample_app::{HttpServer, Telemetry};

#[derive(Parser)]
#[command(name = "sample-app")]
#[command(about = "Sample service with structured logs, metrics and traces", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::resolve(cli.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sample-app starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        otlp_endpoint = %config.observability.otlp_endpoint,
        tracing_enabled = config.observability.tracing_enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let metrics_handle = metrics::install()?;
    let provider = otel::init_tracer_provider(&config.observability)?;
    let telemetry = Telemetry {
        metrics: metrics_handle,
        tracer: otel::tracer(&provider),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(config, telemetry);
    let result = server.run(listener, shutdown.subscribe()).await;

    otel::shutdown_provider(&provider);
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}
