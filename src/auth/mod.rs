//! Handshake authentication.
//!
//! The only contract the gateway has with the account subsystem: a
//! [`TokenVerifier`] that turns the bearer token presented at connection
//! time into an [`crate::domain::Identity`].

pub mod token;

pub use token::{Claims, JwtVerifier, TokenUser, TokenVerifier, bearer_from_headers};
