use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use drinks_auth::AuthGuard;
use log::debug;

/// Lets the request through only when its bearer token grants the guard's
/// permission. The verified `Claims` are added to the request extensions.
pub(crate) async fn require_permission(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    // A header that is not valid UTF-8 is treated like a missing one
    let authorization = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match guard.authorize(authorization.as_deref()).await {
        Ok(claims) => {
            debug!(
                "Granted '{}' to {} for {} {}",
                guard.permission(),
                claims.subject(),
                request.method(),
                request.uri().path()
            );
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}
