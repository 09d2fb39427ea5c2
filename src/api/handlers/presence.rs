//! Read-only view of who is online.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::PresenceResponse;
use crate::app_state::AppState;

/// `GET /presence` — Display names of everyone currently online.
#[utoipa::path(
    get,
    path = "/api/v1/presence",
    tag = "Presence",
    summary = "List online users",
    description = "Returns the current roster, most recently joined first. Each identity appears once regardless of how many sessions it holds.",
    responses(
        (status = 200, description = "Current roster", body = PresenceResponse),
    )
)]
pub async fn list_presence(State(state): State<AppState>) -> Json<PresenceResponse> {
    let online = state.registry.snapshot().await;
    Json(PresenceResponse {
        count: online.len(),
        online,
    })
}

/// Presence routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/presence", get(list_presence))
}
