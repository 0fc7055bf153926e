use crate::error::AuthError;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::DecodingKey;
use log::{debug, error, warn};
use moka::future::Cache as MokaCache;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A JWKS document whose entries have not been interpreted yet
#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Value>,
}

impl JwksDocument {
    /// Keeps the entries that parse as JWKs. Providers may publish key types
    /// or algorithms this crate cannot represent; those entries are dropped.
    fn into_jwk_set(self) -> JwkSet {
        let keys = self
            .keys
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Jwk>(entry) {
                Ok(jwk) => Some(jwk),
                Err(e) => {
                    debug!("Skipping unsupported signing key entry: {}", e);
                    None
                }
            })
            .collect();
        JwkSet { keys }
    }
}

/// Trusted RS256 public keys indexed by key id.
///
/// Built once from a JWKS document and never modified afterwards; a refresh
/// produces a new `KeySet`.
#[derive(Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, DecodingKey>,
}

impl KeySet {
    /// Builds a key set from a JWKS document, keeping only RSA keys that
    /// carry a key id and are not bound to some other algorithm.
    pub fn from_jwks(jwks: &JwkSet) -> Self {
        let mut keys = HashMap::new();

        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                warn!("Skipping signing key without a key id");
                continue;
            };

            if let Some(alg) = jwk.common.key_algorithm {
                if alg != KeyAlgorithm::RS256 {
                    debug!("Skipping signing key '{}' bound to {:?}", kid, alg);
                    continue;
                }
            }

            let AlgorithmParameters::RSA(rsa) = &jwk.algorithm else {
                debug!("Skipping non-RSA signing key '{}'", kid);
                continue;
            };

            match DecodingKey::from_rsa_components(&rsa.n, &rsa.e) {
                Ok(key) => {
                    keys.insert(kid.to_string(), key);
                }
                Err(e) => warn!("Skipping unusable RSA signing key '{}': {}", kid, e),
            }
        }

        Self { keys }
    }

    /// Parses a raw JWKS JSON document
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let document: JwksDocument = serde_json::from_str(json)
            .map_err(|e| AuthError::KeySetUnavailable(format!("invalid JWKS document: {e}")))?;
        Ok(Self::from_jwks(&document.into_jwk_set()))
    }

    pub fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kids: Vec<&String> = self.keys.keys().collect();
        kids.sort();
        f.debug_struct("KeySet").field("kids", &kids).finish()
    }
}

/// Key set fetched over HTTP and cached for a fixed time-to-live.
///
/// Concurrent lookups during a miss share a single fetch. Failed fetches are
/// not cached, so the next request retries the endpoint.
#[derive(Clone)]
pub struct RemoteKeySet {
    url: String,
    client: reqwest::Client,
    cache: MokaCache<(), Arc<KeySet>>,
}

impl RemoteKeySet {
    pub fn new(url: impl Into<String>, ttl: Duration, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(format!("HTTP client setup failed: {e}")))?;

        let cache = MokaCache::builder()
            .max_capacity(1)
            .time_to_live(ttl)
            .build();

        Ok(Self {
            url: url.into(),
            client,
            cache,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the cached key set, fetching it when absent or expired
    pub async fn current(&self) -> Result<Arc<KeySet>, AuthError> {
        self.cache
            .try_get_with((), self.fetch())
            .await
            .map_err(|e| (*e).clone())
    }

    async fn fetch(&self) -> Result<Arc<KeySet>, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                error!("Failed to fetch signing key set from {}: {}", self.url, e);
                AuthError::KeySetUnavailable(e.to_string())
            })?;

        let document: JwksDocument = response.json().await.map_err(|e| {
            error!("Invalid signing key set document from {}: {}", self.url, e);
            AuthError::KeySetUnavailable(format!("invalid JWKS document: {e}"))
        })?;

        let keys = KeySet::from_jwks(&document.into_jwk_set());
        if keys.is_empty() {
            error!("Signing key set from {} contains no usable RS256 keys", self.url);
            return Err(AuthError::KeySetUnavailable(
                "no usable RS256 keys".to_string(),
            ));
        }

        debug!(
            "Fetched signing key set from {} with {} key(s)",
            self.url,
            keys.len()
        );
        Ok(Arc::new(keys))
    }
}

/// Where the verifier obtains its trusted keys
#[derive(Clone)]
pub enum KeySource {
    /// Fixed keys supplied at construction
    Static(Arc<KeySet>),
    /// Keys fetched from a JWKS endpoint and cached
    Remote(RemoteKeySet),
}

impl KeySource {
    pub fn fixed(keys: KeySet) -> Self {
        Self::Static(Arc::new(keys))
    }

    pub async fn current(&self) -> Result<Arc<KeySet>, AuthError> {
        match self {
            Self::Static(keys) => Ok(Arc::clone(keys)),
            Self::Remote(remote) => remote.current().await,
        }
    }
}
