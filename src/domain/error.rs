//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// UserId validation error
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    /// UserId too long error
    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// JoinToken validation error
    #[error("JoinToken cannot be empty")]
    JoinTokenEmpty,
}

/// Errors related to Room domain logic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Room capacity exceeded error
    #[error("Room capacity exceeded: maximum {capacity} participants allowed (current: {current})")]
    CapacityExceeded { capacity: usize, current: usize },

    /// Room already removed from the registry
    #[error("Room has been closed")]
    RoomClosed,

    /// Operation references a participant that is not a room member
    #[error("Participant '{0}' is not a member of this room")]
    ParticipantNotFound(String),
}

/// Errors returned by the session registry.
///
/// `RoomFull` and `RoomNotFound` are ordinary admission outcomes, reported
/// to the connecting client; they never crash the registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Unknown room identifier or join token (also used for revoked tokens)
    #[error("Room not found")]
    RoomNotFound,

    /// Room is at participant capacity
    #[error("Room is full: maximum {capacity} participants allowed")]
    RoomFull { capacity: usize },

    /// The user is not registered in any room
    #[error("Participant '{0}' is not registered")]
    ParticipantNotFound(String),

    /// The user is already a member of a room
    #[error("Participant '{0}' has already joined a room")]
    AlreadyJoined(String),
}
