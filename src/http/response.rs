//! Response bodies and their mapping from handler outcomes.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::work::WorkResult;

/// Body of every simulated failure.
pub const ERROR_BODY: &str = "error";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Success body of `GET /work`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkReply {
    pub ok: bool,
    pub delay: f64,
}

impl IntoResponse for WorkResult {
    fn into_response(self) -> Response {
        if self.is_success() {
            Json(WorkReply {
                ok: true,
                delay: self.delay,
            })
            .into_response()
        } else {
            let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, ERROR_BODY).into_response()
        }
    }
}

/// Plain 500 for work that never produced a result.
pub fn work_aborted() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, ERROR_BODY).into_response()
}

/// Query validation failure with 422. `detail` is a list of problems, each
/// naming where it was found.
pub fn invalid_query(rejection: QueryRejection) -> Response {
    let detail = serde_json::json!([{
        "type": "bool_parsing",
        "loc": ["query", "fail"],
        "msg": rejection.body_text(),
    }]);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({ "detail": detail })),
    )
        .into_response()
}
