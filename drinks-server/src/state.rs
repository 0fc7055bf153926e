use crate::config::Settings;
use crate::storage::{create_repository, DrinkRepository, RepositoryError};
use drinks_auth::{AuthError, AuthGuard, KeySource, RemoteKeySet, TokenVerifier};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures while assembling the application state at start-up
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid JWKS URL: {0}")]
    JwksUrl(#[from] url::ParseError),
    #[error("Failed to set up token verification: {0}")]
    Auth(#[from] AuthError),
    #[error("Failed to open drinks storage: {0}")]
    Storage(#[from] RepositoryError),
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub verifier: Arc<TokenVerifier>,
    pub drinks: Arc<dyn DrinkRepository>,
}

impl AppState {
    pub async fn new(settings: &Settings) -> Result<Self, StateError> {
        let verifier = Self::create_verifier(settings)?;
        let drinks = create_repository(&settings.database).await?;
        Ok(Self {
            settings: Arc::new(settings.clone()),
            verifier: Arc::new(verifier),
            drinks,
        })
    }

    fn create_verifier(settings: &Settings) -> Result<TokenVerifier, StateError> {
        let auth = &settings.auth;
        let jwks_url = auth.jwks_url()?;
        info!(
            "Verifying tokens issued by {} for audience {} with keys from {}",
            auth.issuer(),
            auth.audience,
            jwks_url
        );

        let keys = RemoteKeySet::new(
            jwks_url.as_str(),
            Duration::from_secs(auth.jwks_ttl),
            Duration::from_secs(auth.jwks_timeout),
        )?;
        Ok(
            TokenVerifier::new(KeySource::Remote(keys), &auth.issuer(), &auth.audience)
                .with_leeway(auth.leeway),
        )
    }

    /// A guard requiring `permission`, sharing this state's verifier
    pub fn guard(&self, permission: &str) -> AuthGuard {
        AuthGuard::new(Arc::clone(&self.verifier), permission)
    }

    /// Check if all components are healthy
    pub async fn health_check(&self) -> bool {
        match self.drinks.ping().await {
            Ok(()) => true,
            Err(e) => {
                error!("Readiness check failed: {}", e);
                false
            }
        }
    }
}
