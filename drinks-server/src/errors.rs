use crate::models::ValidationError;
use crate::storage::RepositoryError;
use axum::response::IntoResponse;
use axum::Json;
use drinks_auth::AuthError;
use http::StatusCode;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every failed request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Always false
    pub success: bool,
    /// HTTP status code
    pub error: u16,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a message and status code
    pub fn new<S: ToString>(message: S, status_code: StatusCode) -> Self {
        Self {
            message: message.to_string(),
            status_code,
        }
    }

    /// Create new Bad Request Error (400)
    pub fn bad_request() -> Self {
        Self::new("bad request", StatusCode::BAD_REQUEST)
    }

    /// Create new Not Found Error (404)
    pub fn not_found() -> Self {
        Self::new("resource not found", StatusCode::NOT_FOUND)
    }

    /// Create new Method Not Allowed Error (405)
    pub fn method_not_allowed() -> Self {
        Self::new("method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    }

    /// Create new Unprocessable Entity Error (422)
    pub fn unprocessable() -> Self {
        Self::new("unprocessable", StatusCode::UNPROCESSABLE_ENTITY)
    }

    /// Create new Internal Server Error (500)
    pub fn internal() -> Self {
        Self::new("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create new Bad Gateway (502) with a message
    pub fn bad_gateway<S: ToString>(message: S) -> Self {
        Self::new(message, StatusCode::BAD_GATEWAY)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            success: false,
            error: self.status_code.as_u16(),
            message: self.message,
        };
        (self.status_code, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        // The token itself is never logged
        warn!("Request rejected: {}", err.kind());
        match err {
            AuthError::PermissionDenied(_) => Self::new(err, StatusCode::FORBIDDEN),
            AuthError::KeySetUnavailable(detail) => {
                error!("Signing keys unavailable: {}", detail);
                Self::bad_gateway("signing keys unavailable")
            }
            _ => Self::new(err, StatusCode::UNAUTHORIZED),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => {
                debug!("Drink {} not found", id);
                Self::not_found()
            }
            RepositoryError::DuplicateId(id) => {
                warn!("Refusing to create drink {}: id already taken", id);
                Self::unprocessable()
            }
            RepositoryError::Storage(detail) => {
                error!("Storage failure: {}", detail);
                Self::internal()
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        debug!("Invalid drink payload: {}", err);
        Self::unprocessable()
    }
}
