//! Bearer token verification.
//!
//! Tokens are HS256 JWTs minted by the account subsystem with the claims
//! `{"user": {"id", "username"}, "iat", "exp"}`. The gateway only verifies
//! them; it never issues tokens.

use std::fmt;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::Identity;
use crate::error::AuthError;

/// Account fields embedded in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    /// Stable account identifier.
    pub id: String,
    /// Display name.
    pub username: String,
}

/// JWT claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated account.
    pub user: TokenUser,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(default)]
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Maps a bearer token to the identity it was issued for.
///
/// Implementations must be pure with respect to the token, the current time,
/// and their secret: no side effects, no I/O that could stall admission.
pub trait TokenVerifier: Send + Sync + fmt::Debug {
    /// Verifies `token` and extracts its identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] for every kind of failure.
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// [`TokenVerifier`] for HS256 JWTs signed with a shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Creates a verifier for tokens signed with `secret`.
    ///
    /// `leeway_secs` is the clock skew tolerated when checking `exp`.
    #[must_use]
    pub fn new(secret: &[u8], leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError);
        }
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "token rejected");
            AuthError
        })?;
        let TokenUser { id, username } = data.claims.user;
        if id.is_empty() || username.trim().is_empty() {
            tracing::debug!("token rejected: empty identity claim");
            return Err(AuthError);
        }
        Ok(Identity::new(id, username))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}
