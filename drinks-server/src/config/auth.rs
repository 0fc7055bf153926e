//! Token verification configuration

use confique::Config;
use url::Url;

const JWKS_PATH: &str = ".well-known/jwks.json";

/// Identity provider settings used to verify bearer tokens
#[derive(Debug, Config, Clone)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `tenant.eu.auth0.com` (required)
    #[config(env = "DRINKS_AUTH_DOMAIN")]
    pub domain: String,

    /// Expected `aud` claim (required)
    #[config(env = "DRINKS_AUTH_AUDIENCE")]
    pub audience: String,

    /// Expected `iss` claim (default: https://<domain>/)
    #[config(env = "DRINKS_AUTH_ISSUER")]
    pub issuer: Option<String>,

    /// Signing key set endpoint (default: https://<domain>/.well-known/jwks.json)
    #[config(env = "DRINKS_AUTH_JWKS_URL")]
    pub jwks_url: Option<String>,

    /// How long a fetched key set is trusted, in seconds (default: 600)
    #[config(env = "DRINKS_AUTH_JWKS_TTL", default = 600)]
    pub jwks_ttl: u64,

    /// Timeout for fetching the key set, in seconds (default: 5)
    #[config(env = "DRINKS_AUTH_JWKS_TIMEOUT", default = 5)]
    pub jwks_timeout: u64,

    /// Clock skew tolerated when checking token expiry, in seconds (default: 0)
    #[config(env = "DRINKS_AUTH_LEEWAY", default = 0)]
    pub leeway: u64,
}

impl AuthConfig {
    fn domain_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("https://{}/", self.domain.trim_end_matches('/')))
    }

    /// The trusted issuer
    pub fn issuer(&self) -> String {
        match &self.issuer {
            Some(issuer) => issuer.clone(),
            None => format!("https://{}/", self.domain.trim_end_matches('/')),
        }
    }

    /// The signing key set endpoint
    pub fn jwks_url(&self) -> Result<Url, url::ParseError> {
        match &self.jwks_url {
            Some(url) => Url::parse(url),
            None => self.domain_url()?.join(JWKS_PATH),
        }
    }
}
