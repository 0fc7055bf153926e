use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Basic health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Health {
    status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(skip)]
    status_code: StatusCode,
}

impl Health {
    fn new(status: &str, database: Option<&str>, status_code: StatusCode) -> Self {
        Self {
            status: status.to_string(),
            database: database.map(str::to_string),
            status_code,
        }
    }
}

impl IntoResponse for Health {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

/// Basic health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = Health)
    )
)]
pub(crate) async fn health_check() -> Health {
    Health::new("ok", None, StatusCode::OK)
}

/// Readiness check handler
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = Health),
        (status = 503, description = "Database is not answering", body = Health)
    )
)]
pub(crate) async fn ready_check(State(state): State<AppState>) -> Health {
    if state.health_check().await {
        Health::new("ok", Some("healthy"), StatusCode::OK)
    } else {
        Health::new("error", Some("unavailable"), StatusCode::SERVICE_UNAVAILABLE)
    }
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}
