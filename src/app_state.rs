//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::{JwtVerifier, TokenVerifier};
use crate::config::GatewayConfig;
use crate::domain::{BroadcastHub, ConnectionRegistry, PresenceNotifier};
use crate::ws::SessionContext;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Verifies handshake tokens.
    pub verifier: Arc<dyn TokenVerifier>,
    /// Fan-out for chat and presence events.
    pub hub: BroadcastHub,
    /// Who is online; mutated only through `presence`.
    pub registry: Arc<ConnectionRegistry>,
    /// Emits join/leave notices on registry transitions.
    pub presence: Arc<PresenceNotifier>,
    /// Longest accepted chat body, in characters.
    pub max_message_len: usize,
}

impl AppState {
    /// Wires the domain layer around an arbitrary token verifier.
    #[must_use]
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        hub_capacity: usize,
        max_message_len: usize,
    ) -> Self {
        let hub = BroadcastHub::new(hub_capacity);
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Arc::new(PresenceNotifier::new(Arc::clone(&registry), hub.clone()));
        Self {
            verifier,
            hub,
            registry,
            presence,
            max_message_len,
        }
    }

    /// Builds the state for a running gateway, verifying HS256 tokens with
    /// the configured secret.
    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        let verifier = JwtVerifier::new(config.jwt_secret.as_bytes(), config.jwt_leeway_secs);
        Self::new(
            Arc::new(verifier),
            config.hub_capacity,
            config.max_message_len,
        )
    }

    /// Collaborators handed to each new session.
    #[must_use]
    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            verifier: Arc::clone(&self.verifier),
            hub: self.hub.clone(),
            presence: Arc::clone(&self.presence),
            max_message_len: self.max_message_len,
        }
    }
}
