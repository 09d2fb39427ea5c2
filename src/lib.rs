//! # chat-gateway
//!
//! Authenticated real-time presence and broadcast gateway for chat clients.
//!
//! Clients open a WebSocket at `/ws` carrying a bearer token. The gateway
//! verifies the token, binds the connection to the identity inside it,
//! tracks who is online, and relays chat messages and join/leave notices
//! to every connected session in one consistent order. Account management
//! and token issuance live elsewhere.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS Handler (ws/handler)      token check, upgrade
//!     ├── REST Handlers (api/)         health, presence
//!     │
//!     ├── SessionActor (ws/session)    one per connection
//!     │
//!     ├── PresenceNotifier (domain/)   join/leave on transitions
//!     ├── ConnectionRegistry (domain/) identity → live session count
//!     └── BroadcastHub (domain/)       ordered fan-out, slow-consumer eviction
//! ```
//!
//! ## Wire protocol
//!
//! Every frame is `{"event": <name>, "data": <payload>}`.
//!
//! | Direction | Event             | Payload                                           |
//! |-----------|-------------------|---------------------------------------------------|
//! | in        | `send_message`    | `{"message": string}`                             |
//! | out       | `receive_message` | `{"username", "message", "timestamp", "userId"}`  |
//! | out       | `system_message`  | `{"message", "timestamp"}`                        |
//! | out       | `user_list`       | `[display name, ...]`, most recent first          |

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod ws;
