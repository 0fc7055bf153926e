//! Fixture keys and a token issuer for tests.
//!
//! The RSA keys in `testdata/` are throwaway test keys. Only the primary key
//! is published in [`jwks`]; the rogue key exists to produce tokens the
//! verifier must not trust.

use crate::keys::KeySet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

pub const ISSUER: &str = "https://drinks.example.com/";
pub const AUDIENCE: &str = "drinks";
pub const PRIMARY_KID: &str = "primary";
pub const ROGUE_KID: &str = "rogue";

const PRIMARY_PEM: &str = include_str!("../testdata/primary.pem");
const ROGUE_PEM: &str = include_str!("../testdata/rogue.pem");
const PRIMARY_MODULUS: &str = "s84bATDpK8ozgxyGU7fI7vikVyE4bXvBLDDKm8yOsOkWrRDEe7tebohAx5gCm9KTbgWCRqne_SURnfhyiJu_ofjre24OX3XIPOhFr__zZtdrriAEX3Y8d8hZx1u9yRmKgKak77ImY-iD8QLyiaVdIJNlS22YxemT_9ZJvRxegYlInD3h213-35plQyNH-Lp0ERvrNKu_tvJCEg1SXIV6dYk4kyEvJe0JffDgxaT9YofP67btMwIrpNZMeycF2H99ecSwdABuMJpo1nP7gdW4mblhI2tqo0Ybs92Sr7ifWjOPIibJMaUkQgLTm2xhLkTn_oXew_APgVSqE1hyzbU-pQ";
const PUBLIC_EXPONENT: &str = "AQAB";

/// Which fixture key signs a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKey {
    Primary,
    Rogue,
}

impl TestKey {
    fn encoding_key(self) -> EncodingKey {
        let pem = match self {
            Self::Primary => PRIMARY_PEM,
            Self::Rogue => ROGUE_PEM,
        };
        EncodingKey::from_rsa_pem(pem.as_bytes()).expect("Failed to load fixture RSA key")
    }
}

/// JWKS document publishing the primary fixture key, shaped like an
/// identity provider's `/.well-known/jwks.json`
pub fn jwks() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": PRIMARY_KID,
            "n": PRIMARY_MODULUS,
            "e": PUBLIC_EXPONENT,
        }]
    })
}

pub fn key_set() -> KeySet {
    KeySet::from_json(&jwks().to_string()).expect("Failed to parse fixture JWKS")
}

pub fn base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Mints tokens for a given issuer and audience
#[derive(Debug, Clone)]
pub struct TestIssuer {
    pub issuer: String,
    pub audience: String,
}

impl Default for TestIssuer {
    fn default() -> Self {
        Self::new(ISSUER, AUDIENCE)
    }
}

impl TestIssuer {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Claims valid for one hour; `None` leaves out the permissions claim
    pub fn claims(&self, permissions: Option<&[&str]>) -> Value {
        let mut claims = json!({
            "iss": self.issuer,
            "aud": self.audience,
            "exp": get_current_timestamp() + 3600,
        });
        if let Some(permissions) = permissions {
            claims["permissions"] = json!(permissions);
        }
        claims
    }

    pub fn sign(&self, claims: &Value) -> String {
        self.sign_with(TestKey::Primary, Some(PRIMARY_KID), claims)
    }

    pub fn sign_with(&self, key: TestKey, kid: Option<&str>, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(str::to_string);
        encode(&header, claims, &key.encoding_key()).expect("Failed to sign test token")
    }

    /// Signs with HMAC, which a verifier trusting only RS256 must refuse
    pub fn sign_hs256(&self, claims: &Value, kid: &str) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());
        encode(&header, claims, &EncodingKey::from_secret(PUBLIC_EXPONENT.as_bytes()))
            .expect("Failed to sign test token")
    }

    /// A valid token granting `permissions`
    pub fn token(&self, permissions: &[&str]) -> String {
        self.sign(&self.claims(Some(permissions)))
    }

    /// `Authorization` header value carrying [`TestIssuer::token`]
    pub fn bearer(&self, permissions: &[&str]) -> String {
        format!("Bearer {}", self.token(permissions))
    }
}
