//! UseCase layer errors.

use thiserror::Error;

use crate::domain::RegistryError;

/// Errors raised while admitting a participant into a room.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// The join link (or bare token) could not be parsed
    #[error("Invalid join link")]
    InvalidJoinLink,

    /// No live room matches the token, or the room was removed mid-join
    #[error("Room not found")]
    RoomNotFound,

    /// The room already holds its maximum number of participants
    #[error("Room is full (capacity: {capacity})")]
    RoomFull { capacity: usize },

    /// The user id is already present in a room
    #[error("User '{0}' is already in a room")]
    AlreadyJoined(String),
}

impl From<RegistryError> for JoinError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::RoomFull { capacity } => JoinError::RoomFull { capacity },
            RegistryError::AlreadyJoined(user_id) => JoinError::AlreadyJoined(user_id),
            _ => JoinError::RoomNotFound,
        }
    }
}
