//! Per-connection session actor.
//!
//! One [`SessionActor`] owns one [`Transport`] for the connection's whole
//! life and moves through an explicit state machine:
//!
//! ```text
//! Connecting ──verify ok──► Active ──peer close / transport error / too slow──► Closed
//!     │
//!     └──────verify failed──────────────────────────────────────────────────► Closed
//! ```
//!
//! The `Connecting` step is [`SessionContext::authenticate`], run by the
//! upgrade handler before any socket exists. Registration with the
//! presence layer happens only on entry to `Active` and deregistration only
//! on exit from it, so a rejected handshake never touches the registry or
//! notifies anyone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::messages::{ClientMessage, ServerMessage};
use super::transport::{CloseReason, Transport};
use crate::auth::TokenVerifier;
use crate::domain::{
    BroadcastHub, ChatEvent, HubEvent, HubSubscription, Identity, PresenceNotifier, Transition,
};
use crate::error::{AuthError, SessionError};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake received, token not yet verified.
    Connecting,
    /// Identity bound, registered, subscribed to the hub.
    Active,
    /// Torn down. Terminal.
    Closed,
}

/// Shared collaborators every session needs.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Verifies handshake tokens.
    pub verifier: Arc<dyn TokenVerifier>,
    /// Fan-out for chat events.
    pub hub: BroadcastHub,
    /// Registry front door; emits join/leave.
    pub presence: Arc<PresenceNotifier>,
    /// Longest accepted chat body, in characters.
    pub max_message_len: usize,
}

impl SessionContext {
    /// Connecting-state check: verifies the handshake token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the token is missing or invalid.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        self.verifier.verify(token.unwrap_or_default())
    }
}

/// Actor owning one connection.
#[derive(Debug)]
pub struct SessionActor<T> {
    id: Uuid,
    identity: Identity,
    connected_at: DateTime<Utc>,
    transport: T,
    subscription: HubSubscription,
    ctx: SessionContext,
    state: SessionState,
    /// Roster to send directly before entering the loop, set when this
    /// session joined an identity that was already online.
    pending_roster: Option<Vec<String>>,
}

impl<T: Transport> SessionActor<T> {
    /// Enters `Active` for an already verified identity.
    ///
    /// Subscribes to the hub before registering, so this session observes
    /// its own join notice and every event after it.
    pub async fn activate(transport: T, identity: Identity, ctx: SessionContext) -> Self {
        let subscription = ctx.hub.subscribe();
        let transition = ctx.presence.session_opened(&identity).await;
        let pending_roster = if transition == Transition::Unchanged {
            Some(ctx.presence.roster().await)
        } else {
            None
        };

        let mut actor = Self {
            id: Uuid::new_v4(),
            identity,
            connected_at: Utc::now(),
            transport,
            subscription,
            ctx,
            state: SessionState::Connecting,
            pending_roster,
        };
        actor.transition(SessionState::Active);
        actor
    }

    /// Session id, unique per connection.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Identity bound at handshake.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Drives the session until it closes, then deregisters it.
    ///
    /// Returns `Ok(())` when the peer closed the connection.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] that forced the session closed.
    pub async fn run(mut self) -> Result<(), SessionError> {
        let outcome = self.pump().await;

        let reason = match &outcome {
            Ok(()) | Err(SessionError::Transport(_)) => CloseReason::Normal,
            Err(SessionError::Backpressure) => CloseReason::TooSlow,
            Err(SessionError::HubClosed | SessionError::Encode(_)) => CloseReason::Error,
        };
        self.shutdown(reason).await;
        outcome
    }

    async fn pump(&mut self) -> Result<(), SessionError> {
        if let Some(roster) = self.pending_roster.take() {
            self.deliver(&HubEvent::Roster(roster)).await?;
        }

        loop {
            tokio::select! {
                inbound = self.transport.recv() => match inbound {
                    Some(Ok(frame)) => self.handle_frame(&frame),
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                },
                event = self.subscription.recv() => {
                    let event = event?;
                    self.deliver(&event).await?;
                }
            }
        }
    }

    /// Handles one inbound frame. Bad input is logged and dropped.
    fn handle_frame(&self, frame: &str) {
        let result = ClientMessage::parse(frame).and_then(|msg| match msg {
            ClientMessage::SendMessage { message } => {
                ChatEvent::from_input(&self.identity, &message, self.ctx.max_message_len)
            }
        });

        match result {
            Ok(Some(chat)) => {
                let delivered = self.ctx.hub.publish(HubEvent::Chat(chat));
                tracing::trace!(session_id = %self.id, delivered, "chat published");
            }
            Ok(None) => {
                tracing::debug!(session_id = %self.id, "empty message discarded");
            }
            Err(e) => {
                tracing::debug!(session_id = %self.id, error = %e, "input discarded");
            }
        }
    }

    /// Encodes and writes one event. A write stuck behind a slow peer is
    /// abandoned as soon as the hub evicts this subscriber.
    async fn deliver(&mut self, event: &HubEvent) -> Result<(), SessionError> {
        let frame = ServerMessage::from(event).to_frame()?;
        tokio::select! {
            sent = self.transport.send(frame) => sent.map_err(SessionError::from),
            () = self.subscription.evicted() => Err(SessionError::Backpressure),
        }
    }

    async fn shutdown(mut self, reason: CloseReason) {
        self.transition(SessionState::Closed);
        let Self {
            id,
            identity,
            connected_at,
            mut transport,
            subscription,
            ctx,
            ..
        } = self;

        drop(subscription);
        let _ = ctx.presence.session_closed(&identity).await;
        transport.close(reason).await;

        let duration_secs = (Utc::now() - connected_at).num_seconds();
        tracing::info!(
            session_id = %id,
            user_id = %identity.id,
            duration_secs,
            ?reason,
            "session closed"
        );
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            matches!(
                (self.state, next),
                (SessionState::Connecting, SessionState::Active)
                    | (SessionState::Connecting | SessionState::Active, SessionState::Closed)
            ),
            "illegal session transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(
            session_id = %self.id,
            user_id = %self.identity.id,
            from = ?self.state,
            to = ?next,
            "session state change"
        );
        self.state = next;
    }
}
