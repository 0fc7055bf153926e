use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `aud` may be a single string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::Single(aud) => aud == audience,
            Self::Multiple(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// The subset of a verified token's payload this service relies on.
///
/// Fields not listed here are ignored during decoding. A token without a
/// `permissions` field decodes with `permissions: None`, which is distinct
/// from an empty grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub aud: Audience,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<String>>,
}

impl Claims {
    /// Subject for logging, `"unknown"` when the token has none
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("unknown")
    }
}
