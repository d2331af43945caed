//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use opentelemetry_sdk::trace::TracerProvider;
use sample_app::observability::{metrics, tracing as otel};
use sample_app::{AppConfig, HttpServer, Shutdown, Telemetry};
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;

/// Config for an in-process server: seeded, no trace export, ephemeral port.
pub fn test_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.observability.tracing_enabled = false;
    config.observability.service_name = "sample-app-test".to_string();
    config.work.seed = Some(seed);
    config
}

/// A server plus the provider its tracer belongs to.
pub struct TestApp {
    pub server: HttpServer,
    pub provider: TracerProvider,
}

pub fn build_app(config: AppConfig) -> TestApp {
    let provider = otel::in_process_provider(&config.observability.service_name);
    let telemetry = Telemetry {
        metrics: metrics::install().unwrap(),
        tracer: otel::tracer(&provider),
    };
    TestApp {
        server: HttpServer::new(config, telemetry),
        provider,
    }
}

/// Serve `config` on an ephemeral port. Returns the address and the handle
/// that stops the server.
pub async fn spawn_server(config: AppConfig) -> (SocketAddr, Shutdown, TracerProvider) {
    let TestApp { server, provider } = build_app(config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Wait until the listener answers.
    let client = client();
    for _ in 0..50 {
        if client.get(format!("http://{addr}/healthz")).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    (addr, shutdown, provider)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// In-memory log sink.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Captured lines parsed as JSON.
    pub fn records(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Only the per-request work records.
    pub fn work_records(&self) -> Vec<serde_json::Value> {
        self.records()
            .into_iter()
            .filter(|r| r["event"] == "handled_work")
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
