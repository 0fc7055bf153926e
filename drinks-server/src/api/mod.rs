pub(crate) mod drinks;
mod guard;
pub(crate) mod health;

use crate::errors::ApiError;
use crate::state::AppState;
use axum::Router;

async fn not_found() -> ApiError {
    ApiError::not_found()
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(drinks::router(state))
        .fallback(not_found)
        // Only affects routes registered above
        .method_not_allowed_fallback(method_not_allowed)
}
