use crate::claims::Claims;
use crate::error::AuthError;
use crate::permissions::check_permission;
use crate::verifier::TokenVerifier;
use std::future::Future;
use std::sync::Arc;

/// Authorization decision for one required permission.
///
/// A guard moves through `Start -> TokenDecoded -> PermissionChecked ->
/// Authorized`. Verification failures reject from `Start`, permission
/// failures from `TokenDecoded`. Rejections are final; nothing is retried.
#[derive(Clone)]
pub struct AuthGuard {
    verifier: Arc<TokenVerifier>,
    permission: Arc<str>,
}

impl AuthGuard {
    pub fn new(verifier: Arc<TokenVerifier>, permission: impl Into<Arc<str>>) -> Self {
        Self {
            verifier,
            permission: permission.into(),
        }
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Returns the verified claims when the header carries a valid token
    /// granting this guard's permission
    pub async fn authorize(&self, authorization: Option<&str>) -> Result<Claims, AuthError> {
        let claims = self.verifier.verify(authorization).await?;
        check_permission(&claims, &self.permission)?;
        Ok(claims)
    }

    /// Runs `operation` once if authorized, passing its output through untouched
    pub async fn run<F, Fut, T>(
        &self,
        authorization: Option<&str>,
        operation: F,
    ) -> Result<T, AuthError>
    where
        F: FnOnce(Claims) -> Fut,
        Fut: Future<Output = T>,
    {
        let claims = self.authorize(authorization).await?;
        Ok(operation(claims).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeySource;
    use crate::testing::{self, TestIssuer, AUDIENCE, ISSUER};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn guard(permission: &str) -> AuthGuard {
        let verifier = TokenVerifier::new(KeySource::fixed(testing::key_set()), ISSUER, AUDIENCE);
        AuthGuard::new(Arc::new(verifier), permission)
    }

    async fn run_counted(
        guard: &AuthGuard,
        authorization: Option<&str>,
        calls: &AtomicUsize,
    ) -> Result<&'static str, AuthError> {
        guard
            .run(authorization, |_claims| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                "brewed"
            })
            .await
    }

    #[tokio::test]
    async fn test_missing_header_never_runs_operation() {
        let calls = AtomicUsize::new(0);
        let result = run_counted(&guard("post:drinks"), None, &calls).await;

        assert_eq!(result, Err(AuthError::MissingOrMalformedHeader));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_token_never_runs_operation() {
        let issuer = TestIssuer::default();
        let mut claims = issuer.claims(Some(&["post:drinks"]));
        claims["exp"] = json!(jsonwebtoken::get_current_timestamp() - 3600);
        let header = format!("Bearer {}", issuer.sign(&claims));

        let calls = AtomicUsize::new(0);
        let result = run_counted(&guard("post:drinks"), Some(&header), &calls).await;

        assert_eq!(result, Err(AuthError::TokenExpired));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_permission_denied_never_runs_operation() {
        let header = TestIssuer::default().bearer(&["get:drinks-detail"]);

        let calls = AtomicUsize::new(0);
        let result = run_counted(&guard("post:drinks"), Some(&header), &calls).await;

        assert_eq!(
            result,
            Err(AuthError::PermissionDenied("post:drinks".to_string()))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_permissions_claim() {
        let issuer = TestIssuer::default();
        let header = format!("Bearer {}", issuer.sign(&issuer.claims(None)));

        let calls = AtomicUsize::new(0);
        let result = run_counted(&guard("post:drinks"), Some(&header), &calls).await;

        assert_eq!(result, Err(AuthError::PermissionsClaimMissing));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_authorized_runs_operation_exactly_once() {
        let header = TestIssuer::default().bearer(&["get:drinks-detail", "post:drinks"]);

        let calls = AtomicUsize::new(0);
        let result = run_counted(&guard("post:drinks"), Some(&header), &calls).await;

        assert_eq!(result, Ok("brewed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_operation_receives_verified_claims() {
        let issuer = TestIssuer::default();
        let mut claims = issuer.claims(Some(&["delete:drinks"]));
        claims["sub"] = json!("auth0|manager");
        let header = format!("Bearer {}", issuer.sign(&claims));

        let subject = guard("delete:drinks")
            .run(Some(&header), |claims| async move { claims.subject().to_string() })
            .await;

        assert_eq!(subject, Ok("auth0|manager".to_string()));
    }

    #[tokio::test]
    async fn test_operation_errors_pass_through_unchanged() {
        let header = TestIssuer::default().bearer(&["patch:drinks"]);

        let result: Result<Result<(), String>, AuthError> = guard("patch:drinks")
            .run(Some(&header), |_| async { Err("not found".to_string()) })
            .await;

        assert_eq!(result, Ok(Err("not found".to_string())));
    }

    #[tokio::test]
    async fn test_authorize_returns_claims() {
        let header = TestIssuer::default().bearer(&["get:drinks-detail"]);
        let guard = guard("get:drinks-detail");

        let claims = guard.authorize(Some(&header)).await.unwrap();

        assert_eq!(guard.permission(), "get:drinks-detail");
        assert_eq!(claims.iss, ISSUER);
    }
}
