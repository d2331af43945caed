//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, server span, timeout, trace)
//! - Bind server to listener
//! - Keep the metrics registry tidy while serving
//! - Drain in-flight requests on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use opentelemetry_sdk::trace::Tracer;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::instrument::WithSubscriber;

use crate::config::AppConfig;
use crate::http::request::{
    propagate_request_id_layer, server_span, set_request_id_layer, RequestTrace, WorkParams,
    X_REQUEST_ID,
};
use crate::http::response::{invalid_query, work_aborted, HealthStatus};
use crate::observability::metrics::CONTENT_TYPE;
use crate::observability::Telemetry;
use crate::work::{FailureInjector, WorkHandler, WorkProfile};

/// Registry upkeep cadence.
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub work: Arc<WorkHandler>,
    pub metrics: PrometheusHandle,
    pub tracer: Tracer,
}

/// HTTP server for the work service.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    metrics: PrometheusHandle,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, telemetry: Telemetry) -> Self {
        let work = WorkHandler::new(
            WorkProfile::from(&config.work),
            FailureInjector::new(config.work.seed),
            telemetry.tracer.clone(),
        );

        let state = AppState {
            work: Arc::new(work),
            metrics: telemetry.metrics.clone(),
            tracer: telemetry.tracer,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            metrics: telemetry.metrics,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(healthz))
            .route("/metrics", get(metrics_handler))
            .route("/work", get(work_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), server_span))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id
                )
            }))
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.observability.service_name,
            "HTTP server starting"
        );

        let upkeep = spawn_upkeep(self.metrics.clone(), shutdown.resubscribe());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        upkeep.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn spawn_upkeep(
    handle: PrometheusHandle,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(UPKEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => handle.run_upkeep(),
                _ = shutdown.recv() => break,
            }
        }
    })
}

async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        state.metrics.render(),
    )
        .into_response()
}

/// `GET /work`. The unit runs in its own task so that a dropped connection
/// or a request timeout cannot cut its telemetry short.
async fn work_handler(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
    params: Result<Query<WorkParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return invalid_query(rejection),
    };

    let work = state.work.clone();
    let task = tokio::spawn(
        async move { work.run(trace.context(), params.fail).await }.with_current_subscriber(),
    );

    match task.await {
        Ok(result) => result.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Work task did not complete");
            work_aborted()
        }
    }
}
