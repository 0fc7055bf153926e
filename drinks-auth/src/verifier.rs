use crate::claims::Claims;
use crate::error::AuthError;
use crate::keys::KeySource;
use jsonwebtoken::{decode, decode_header, get_current_timestamp, Algorithm, Validation};
use serde_json::Value;

/// Extracts the token from an `Authorization` header value.
///
/// The value must be exactly `<scheme> <token>` with a `Bearer` scheme
/// (compared case-insensitively).
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingOrMalformedHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(AuthError::MissingOrMalformedHeader),
    }
}

/// Verifies RS256 bearer tokens against a trusted key source.
///
/// Checks run in a fixed order: header shape, token shape, algorithm and key
/// id, signature, then `exp`, `iss` and `aud`. The first failing check
/// decides the error.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: KeySource,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: KeySource, issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = 0;

        Self { keys, validation }
    }

    /// Tolerate clock skew of `seconds` when checking `exp`
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.validation.leeway = seconds;
        self
    }

    pub fn keys(&self) -> &KeySource {
        &self.keys
    }

    /// Verifies the token carried by an `Authorization` header value
    pub async fn verify(&self, authorization: Option<&str>) -> Result<Claims, AuthError> {
        let token = bearer_token(authorization)?;
        self.verify_token(token).await
    }

    pub async fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        if token.split('.').count() != 3 {
            return Err(AuthError::MalformedToken);
        }

        // Unknown algorithms such as "none" fail to decode here
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnknownSigningKey);
        }
        let kid = header.kid.ok_or(AuthError::UnknownSigningKey)?;

        let keys = self.keys.current().await?;
        let key = keys.get(&kid).ok_or(AuthError::UnknownSigningKey)?;

        // Decoded loosely first so that a missing `exp`, `iss` or `aud` is
        // reported by the standard claim checks rather than as a shape error.
        let data = decode::<Value>(token, key, &self.validation)?;
        let claims: Claims =
            serde_json::from_value(data.claims).map_err(|_| AuthError::MalformedToken)?;

        // Expiry must lie strictly in the future; `exp == now` is already expired
        if claims.exp.saturating_add(self.validation.leeway) <= get_current_timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}
