//! Bearer token verification and permission checks for the drinks API.
//!
//! Tokens are RS256 JWTs issued by an external identity provider. The
//! [`TokenVerifier`] checks them against a JWKS-backed [`KeySource`], and an
//! [`AuthGuard`] combines verification with a required permission string
//! taken from the token's `permissions` claim.

mod claims;
mod error;
mod guard;
mod keys;
mod permissions;
mod verifier;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use claims::{Audience, Claims};
pub use error::AuthError;
pub use guard::AuthGuard;
pub use keys::{KeySet, KeySource, RemoteKeySet};
pub use permissions::check_permission;
pub use verifier::{bearer_token, TokenVerifier};
