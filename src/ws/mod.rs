//! WebSocket layer: upgrade handling, the session actor, and wire messages.
//!
//! The endpoint at `/ws` authenticates the handshake before upgrading and
//! then hands the socket to a [`session::SessionActor`] for the rest of the
//! connection's life.

pub mod handler;
pub mod messages;
pub mod session;
pub mod transport;

pub use session::{SessionActor, SessionContext, SessionState};
pub use transport::{CloseReason, Transport, WsTransport};
