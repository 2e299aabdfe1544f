//! Infrastructure layer: wire DTOs and the in-memory registry.

pub mod dto;
pub mod registry;
