//! OpenAPI document for the REST surface.
//!
//! The WebSocket protocol is described in the crate docs; OpenAPI only
//! covers the plain HTTP endpoints and the handshake's `401` body.

use utoipa::OpenApi;

use crate::api::dto::{HealthResponse, PresenceResponse};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "chat-gateway", description = "Presence and broadcast gateway for chat clients"),
    paths(
        crate::api::handlers::system::health_handler,
        crate::api::handlers::presence::list_presence,
    ),
    components(schemas(HealthResponse, PresenceResponse, ErrorResponse, ErrorBody)),
    tags(
        (name = "System", description = "Service health"),
        (name = "Presence", description = "Who is online"),
    )
)]
pub struct ApiDoc;
