//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::session::SessionActor;
use super::transport::WsTransport;
use crate::app_state::AppState;
use crate::auth::bearer_from_headers;
use crate::error::GatewayError;

/// Handshake query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    /// Bearer token, for clients that cannot set headers on the handshake.
    pub token: Option<String>,
}

/// `GET /ws` — Authenticate, then upgrade HTTP connection to WebSocket.
///
/// The token comes from `Authorization: Bearer <token>` or, failing that,
/// from the `token` query parameter. A handshake without a valid token is
/// answered with `401` and never upgraded.
pub async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let ctx = state.session_context();
    let token = bearer_from_headers(&headers).or(query.token.as_deref());

    let identity = match ctx.authenticate(token) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(has_token = token.is_some(), "websocket handshake rejected");
            return GatewayError::from(e).into_response();
        }
    };

    tracing::info!(user_id = %identity.id, "websocket handshake accepted");
    ws.on_upgrade(move |socket| async move {
        let actor = SessionActor::activate(WsTransport::new(socket), identity, ctx).await;
        let session_id = actor.id();
        if let Err(e) = actor.run().await {
            tracing::warn!(%session_id, error = %e, "session ended with error");
        }
    })
}
