//! Duplex channel abstraction between a session and its peer.
//!
//! A [`Transport`] moves text frames. The session actor decides what the
//! frames mean, so the same actor runs over a WebSocket in production and
//! over an in-memory channel in tests.

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};

use crate::error::TransportError;

/// One physical connection, owned by exactly one session actor.
#[async_trait]
pub trait Transport: Send {
    /// Writes one text frame to the peer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the connection can no longer be
    /// written to.
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Waits for the next text frame.
    ///
    /// Returns `None` once the peer closed the connection. Must be cancel
    /// safe: a dropped call never loses a frame.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    /// Closes the connection. Best effort; never fails.
    async fn close(&mut self, reason: CloseReason);
}

/// Why the gateway is closing a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Normal teardown.
    Normal,
    /// The peer could not keep up with the broadcast rate.
    TooSlow,
    /// The gateway hit an internal error.
    Error,
}

/// [`Transport`] over an axum WebSocket.
#[derive(Debug)]
pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    /// Wraps an upgraded WebSocket.
    #[must_use]
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.socket
            .send(Message::text(frame))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.socket.recv().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => {
                    tracing::debug!(reason = ?frame, "peer sent close frame");
                    return None;
                }
                // Pings are answered by the WebSocket layer; binary frames
                // are not part of the protocol.
                Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => return Some(Err(TransportError(e.to_string()))),
            }
        }
    }

    async fn close(&mut self, reason: CloseReason) {
        let (code, text) = match reason {
            CloseReason::Normal => (close_code::NORMAL, "bye"),
            CloseReason::TooSlow => (close_code::AGAIN, "too slow"),
            CloseReason::Error => (close_code::ERROR, "internal error"),
        };
        let frame = CloseFrame {
            code,
            reason: text.into(),
        };
        if let Err(e) = self.socket.send(Message::Close(Some(frame))).await {
            tracing::trace!(error = %e, "close frame not delivered");
        }
    }
}
