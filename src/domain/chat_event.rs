//! Events that flow through the [`super::BroadcastHub`].
//!
//! Sessions create [`ChatEvent`]s from client input, the
//! [`super::PresenceNotifier`] creates [`SystemEvent`]s and rosters. None of
//! them is persisted or mutated after creation.

use chrono::{DateTime, Utc};

use super::Identity;
use crate::error::InputError;

/// A chat line sent by an authenticated participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Identity bound to the sending session.
    pub sender: Identity,
    /// Trimmed, non-empty message body.
    pub body: String,
    /// Time the gateway accepted the message.
    pub sent_at: DateTime<Utc>,
}

impl ChatEvent {
    /// Builds a chat event from raw client input.
    ///
    /// The body is trimmed. Returns `Ok(None)` when nothing is left after
    /// trimming: whitespace-only input is dropped without an error.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::TooLong`] when the trimmed body exceeds
    /// `max_len` characters.
    pub fn from_input(
        sender: &Identity,
        raw: &str,
        max_len: usize,
    ) -> Result<Option<Self>, InputError> {
        let body = raw.trim();
        if body.is_empty() {
            return Ok(None);
        }
        let len = body.chars().count();
        if len > max_len {
            return Err(InputError::TooLong { len, max: max_len });
        }
        Ok(Some(Self {
            sender: sender.clone(),
            body: body.to_string(),
            sent_at: Utc::now(),
        }))
    }
}

/// Presence transition carried by a [`SystemEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventKind {
    /// The identity's first session opened.
    Joined,
    /// The identity's last session closed.
    Left,
}

/// Gateway-generated notice about a presence transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEvent {
    /// Which transition happened.
    pub kind: SystemEventKind,
    /// Display name of the identity that transitioned.
    pub display_name: String,
    /// Time of the transition.
    pub at: DateTime<Utc>,
}

impl SystemEvent {
    /// A `joined` notice for `display_name`, stamped now.
    #[must_use]
    pub fn joined(display_name: impl Into<String>) -> Self {
        Self {
            kind: SystemEventKind::Joined,
            display_name: display_name.into(),
            at: Utc::now(),
        }
    }

    /// A `left` notice for `display_name`, stamped now.
    #[must_use]
    pub fn left(display_name: impl Into<String>) -> Self {
        Self {
            kind: SystemEventKind::Left,
            display_name: display_name.into(),
            at: Utc::now(),
        }
    }

    /// Human-readable text shown to clients.
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            SystemEventKind::Joined => format!("{} joined the chat", self.display_name),
            SystemEventKind::Left => format!("{} left the chat", self.display_name),
        }
    }
}

/// Everything the hub fans out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    /// A participant's chat line.
    Chat(ChatEvent),
    /// A join or leave notice.
    System(SystemEvent),
    /// Display names currently online, most recently registered first.
    Roster(Vec<String>),
}

impl HubEvent {
    /// Returns the event kind as a static string slice.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::System(_) => "system",
            Self::Roster(_) => "roster",
        }
    }
}
