//! Gateway error types.
//!
//! [`GatewayError`] is the HTTP-facing error: each variant maps to a status
//! code and a structured JSON body. The remaining types never reach HTTP:
//! [`AuthError`] is the uniform token rejection, [`SessionError`] ends one
//! session, and [`InputError`] is discarded inside the session that saw it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "authentication failed"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Token verification failed.
///
/// Carries no detail. Missing, malformed, expired, and badly signed tokens
/// all produce this same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication failed")]
pub struct AuthError;

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category       | HTTP Status      |
/// |-----------|----------------|------------------|
/// | 2000–2999 | Authentication | 401 Unauthorized |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The connection presented no valid bearer token.
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Unauthorized(_) => 2001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Failure of the underlying duplex channel.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Why an active session had to close.
///
/// Every variant is fatal to that one session only.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading from or writing to the connection failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session fell further behind the hub than its buffer allows.
    #[error("subscriber fell behind the broadcast hub")]
    Backpressure,

    /// The hub stopped delivering events.
    #[error("broadcast hub closed")]
    HubClosed,

    /// An outbound event could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Client input that is dropped without closing the session.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The frame is not a recognised client event.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// The chat body exceeds the configured limit.
    #[error("message too long: {len} chars (max {max})")]
    TooLong {
        /// Length of the trimmed body in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
}
