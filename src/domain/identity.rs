//! Verified principal bound to a connection.
//!
//! [`UserId`] is a newtype around the opaque identifier issued by the
//! account subsystem, so it cannot be confused with display names or
//! session ids. [`Identity`] pairs it with the display name taken from the
//! same verified token.

use std::fmt;

use serde::Serialize;

/// Stable identifier of an account.
///
/// Opaque to the gateway: it is copied from the verified token and used as
/// the key in [`super::ConnectionRegistry`] and as `userId` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps an identifier taken from a verified token.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The principal a session acts as.
///
/// Re-derived from the bearer token on every connect and never taken from
/// client payloads. Immutable for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account identifier.
    pub id: UserId,
    /// Name shown to other participants.
    pub display_name: String,
}

impl Identity {
    /// Creates an identity from its parts.
    #[must_use]
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
