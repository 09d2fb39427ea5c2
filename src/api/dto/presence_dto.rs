//! Presence DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Response for `GET /api/v1/presence`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PresenceResponse {
    /// Display names, most recently joined first.
    pub online: Vec<String>,
    /// Number of distinct identities online.
    pub count: usize,
}
