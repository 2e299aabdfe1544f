//! Domain layer for the collaboration server.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod registry;
pub mod value_object;

pub use entity::{Participant, Room, SharedState, ROOM_CAPACITY};
pub use error::{RegistryError, RoomError, ValueObjectError};
pub use factory::{JoinTokenFactory, RoomIdFactory};
pub use registry::{
    BroadcastOutcome, CreatedRoom, JoinOutcome, LeaveOutcome, ParticipantInfo, RoomDetail,
    RoomSummary, SessionRegistry, STALE_ROOM_RETENTION_MS,
};
pub use value_object::{CursorPosition, JoinToken, RoomId, Timestamp, UserId, Username};

#[cfg(test)]
pub use registry::MockSessionRegistry;
