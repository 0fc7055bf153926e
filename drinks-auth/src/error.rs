use thiserror::Error;

/// Reasons a request can be refused by the authorization path.
///
/// Every variant except `PermissionDenied` and `KeySetUnavailable` means the
/// caller's credentials could not be accepted at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is missing or is not of the form 'Bearer <token>'")]
    MissingOrMalformedHeader,

    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token is not signed with a trusted RS256 key")]
    UnknownSigningKey,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token issuer is not trusted")]
    InvalidIssuer,

    #[error("Token audience is invalid")]
    InvalidAudience,

    #[error("Permissions not included in token")]
    PermissionsClaimMissing,

    #[error("Permission '{0}' not granted")]
    PermissionDenied(String),

    #[error("Signing key set unavailable: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    /// Short machine-readable name of the failure, safe to log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingOrMalformedHeader => "missing_or_malformed_header",
            Self::MalformedToken => "malformed_token",
            Self::UnknownSigningKey => "unknown_signing_key",
            Self::InvalidSignature => "invalid_signature",
            Self::TokenExpired => "token_expired",
            Self::InvalidIssuer => "invalid_issuer",
            Self::InvalidAudience => "invalid_audience",
            Self::PermissionsClaimMissing => "permissions_claim_missing",
            Self::PermissionDenied(_) => "permission_denied",
            Self::KeySetUnavailable(_) => "key_set_unavailable",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnknownSigningKey
            }
            ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
                "exp" => Self::TokenExpired,
                "iss" => Self::InvalidIssuer,
                "aud" => Self::InvalidAudience,
                _ => Self::MalformedToken,
            },
            _ => Self::MalformedToken,
        }
    }
}
