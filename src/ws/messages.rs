//! Wire vocabulary exchanged with chat clients.
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{HubEvent, UserId};
use crate::error::InputError;

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Join/leave notice.
    SystemMessage {
        /// Text to display, e.g. `"alice joined the chat"`.
        message: String,
        /// When the transition happened.
        timestamp: DateTime<Utc>,
    },
    /// A chat line from a participant.
    ReceiveMessage {
        /// Sender's display name.
        username: String,
        /// Trimmed message body.
        message: String,
        /// When the gateway accepted the message.
        timestamp: DateTime<Utc>,
        /// Sender's stable account id.
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    /// Everyone currently online, most recently joined first.
    UserList(Vec<String>),
}

impl ServerMessage {
    /// Encodes the message as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if encoding fails.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&HubEvent> for ServerMessage {
    fn from(event: &HubEvent) -> Self {
        match event {
            HubEvent::Chat(chat) => Self::ReceiveMessage {
                username: chat.sender.display_name.clone(),
                message: chat.body.clone(),
                timestamp: chat.sent_at,
                user_id: chat.sender.id.clone(),
            },
            HubEvent::System(system) => Self::SystemMessage {
                message: system.message(),
                timestamp: system.at,
            },
            HubEvent::Roster(names) => Self::UserList(names.clone()),
        }
    }
}

/// Client → server events.
///
/// Extra fields (a client-supplied `username`, for instance) are ignored;
/// the sender is always the session's verified identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Post a chat line.
    SendMessage {
        /// Raw, untrimmed body.
        message: String,
    },
}

impl ClientMessage {
    /// Decodes a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Malformed`] for invalid JSON, unknown events,
    /// or a `message` that is not a string.
    pub fn parse(frame: &str) -> Result<Self, InputError> {
        serde_json::from_str(frame).map_err(|e| InputError::Malformed(e.to_string()))
    }
}
