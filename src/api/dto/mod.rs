//! Data Transfer Objects for REST response serialization.

pub mod presence_dto;
pub mod system_dto;

pub use presence_dto::*;
pub use system_dto::*;
