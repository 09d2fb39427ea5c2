//! Turns registry transitions into join/leave notices and rosters.
//!
//! All session registration goes through [`PresenceNotifier`]. Each
//! transition (registry mutation, system event, roster) runs under one
//! gate, so observers never see two transitions interleave and the roster
//! that follows a notice always reflects that notice's mutation.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::{BroadcastHub, ConnectionRegistry, HubEvent, Identity, SystemEvent, Transition};

/// Bridges the [`ConnectionRegistry`] and the [`BroadcastHub`].
#[derive(Debug)]
pub struct PresenceNotifier {
    registry: Arc<ConnectionRegistry>,
    hub: BroadcastHub,
    gate: Mutex<()>,
}

impl PresenceNotifier {
    /// Creates a notifier over the given registry and hub.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, hub: BroadcastHub) -> Self {
        Self {
            registry,
            hub,
            gate: Mutex::new(()),
        }
    }

    /// Registers a new session for `identity`.
    ///
    /// If the identity just came online, publishes `joined` followed by the
    /// updated roster before returning. The two events reach every
    /// subscriber back to back.
    pub async fn session_opened(&self, identity: &Identity) -> Transition {
        let _gate = self.gate.lock().await;
        let transition = self.registry.register(identity).await;
        if transition == Transition::CameOnline {
            let roster = self.registry.snapshot().await;
            tracing::info!(
                user_id = %identity.id,
                display_name = %identity.display_name,
                online = roster.len(),
                "user joined"
            );
            let _ = self.hub.publish_all(vec![
                HubEvent::System(SystemEvent::joined(&identity.display_name)),
                HubEvent::Roster(roster),
            ]);
        }
        transition
    }

    /// Deregisters one session of `identity`.
    ///
    /// If that was the identity's last session, publishes `left` followed by
    /// the updated roster before returning. The notice names the identity
    /// as the roster last showed it.
    pub async fn session_closed(&self, identity: &Identity) -> Transition {
        let _gate = self.gate.lock().await;
        let transition = self.registry.deregister(identity).await;
        if let Transition::WentOffline(display_name) = &transition {
            let roster = self.registry.snapshot().await;
            tracing::info!(
                user_id = %identity.id,
                %display_name,
                online = roster.len(),
                "user left"
            );
            let _ = self.hub.publish_all(vec![
                HubEvent::System(SystemEvent::left(display_name.as_str())),
                HubEvent::Roster(roster),
            ]);
        }
        transition
    }

    /// Current roster, most recently registered first.
    pub async fn roster(&self) -> Vec<String> {
        self.registry.snapshot().await
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}
