//! Domain layer: identities, chat events, presence, and fan-out.
//!
//! This module holds the server-side model of who is online and what gets
//! delivered to them: the verified identity bound to each connection, the
//! connection registry, the broadcast hub, and the presence notifier that
//! ties registry transitions to hub events.

pub mod broadcast_hub;
pub mod chat_event;
pub mod connection_registry;
pub mod identity;
pub mod presence;

pub use broadcast_hub::{BroadcastHub, HubSubscription};
pub use chat_event::{ChatEvent, HubEvent, SystemEvent, SystemEventKind};
pub use connection_registry::{ConnectionRegistry, Transition};
pub use identity::{Identity, UserId};
pub use presence::PresenceNotifier;
