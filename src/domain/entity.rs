//! Core domain models for collaboration sessions.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;

use super::{
    error::RoomError,
    value_object::{CursorPosition, JoinToken, RoomId, Timestamp, UserId, Username},
};

/// Maximum number of simultaneous participants in a room.
///
/// Rooms target small ad-hoc pairing/mobbing sessions; last-writer-wins
/// shared state only stays reasonable at this scale.
pub const ROOM_CAPACITY: usize = 4;

/// Represents a collaboration room: the authoritative state of one session.
///
/// All mutation goes through the registry, which serializes operations on a
/// single room behind a per-room lock.
#[derive(Debug, Clone)]
pub struct Room {
    /// Public room identifier
    pub id: RoomId,
    /// Identifier of the creating participant
    pub owner_id: UserId,
    /// Secret admission credential; never exposed by listings
    pub join_token: JoinToken,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
    /// Current members keyed by user id
    pub participants: HashMap<String, Participant>,
    /// Shared document state (last-writer-wins)
    pub shared_state: SharedState,
    /// Last-known cursor positions keyed by user id
    pub cursors: HashMap<String, CursorPosition>,
    /// Maximum number of participants allowed
    pub capacity: usize,
    /// Set once the registry removes the room; blocks late joins
    pub closed: bool,
}

impl Room {
    /// Create a new empty room with the default participant capacity
    pub fn new(id: RoomId, owner_id: UserId, join_token: JoinToken, created_at: Timestamp) -> Self {
        Self::with_capacity(id, owner_id, join_token, created_at, ROOM_CAPACITY)
    }

    /// Create a new empty room with a custom capacity (tests only)
    pub fn with_capacity(
        id: RoomId,
        owner_id: UserId,
        join_token: JoinToken,
        created_at: Timestamp,
        capacity: usize,
    ) -> Self {
        Self {
            id,
            owner_id,
            join_token,
            created_at,
            participants: HashMap::new(),
            shared_state: SharedState::default(),
            cursors: HashMap::new(),
            capacity,
            closed: false,
        }
    }

    /// Add a participant to the room
    ///
    /// # Errors
    ///
    /// Returns `RoomError::CapacityExceeded` if the room is at full capacity,
    /// `RoomError::RoomClosed` if the registry already removed the room.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::RoomClosed);
        }
        if self.participants.len() >= self.capacity {
            return Err(RoomError::CapacityExceeded {
                capacity: self.capacity,
                current: self.participants.len(),
            });
        }
        self.participants
            .insert(participant.id.as_str().to_string(), participant);
        Ok(())
    }

    /// Remove a participant and their cursor entry.
    ///
    /// No-op (returns false) if the user is not a member.
    pub fn remove_participant(&mut self, user_id: &UserId) -> bool {
        self.cursors.remove(user_id.as_str());
        self.participants.remove(user_id.as_str()).is_some()
    }

    /// Replace the shared document state (last-writer-wins).
    ///
    /// With a `file_path`, replaces that entry in the file mapping and makes
    /// it the active file; without one, replaces the single code blob.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::ParticipantNotFound` if the editor is not a member.
    pub fn apply_code_update(
        &mut self,
        user_id: &UserId,
        code: String,
        file_path: Option<String>,
    ) -> Result<(), RoomError> {
        if !self.participants.contains_key(user_id.as_str()) {
            return Err(RoomError::ParticipantNotFound(user_id.as_str().to_string()));
        }
        self.shared_state.apply(code, file_path);
        Ok(())
    }

    /// Overwrite the cursor position for a member
    ///
    /// # Errors
    ///
    /// Returns `RoomError::ParticipantNotFound` if the user is not a member.
    pub fn set_cursor(
        &mut self,
        user_id: &UserId,
        position: CursorPosition,
    ) -> Result<(), RoomError> {
        if !self.participants.contains_key(user_id.as_str()) {
            return Err(RoomError::ParticipantNotFound(user_id.as_str().to_string()));
        }
        self.cursors.insert(user_id.as_str().to_string(), position);
        Ok(())
    }

    /// Set or clear a member's observation target.
    ///
    /// The target is recorded, not enforced: the server only broadcasts the
    /// relationship so clients can render observation indicators.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::ParticipantNotFound` if the observer is not a member.
    pub fn set_observation(
        &mut self,
        observer_id: &UserId,
        target_id: Option<UserId>,
    ) -> Result<(), RoomError> {
        let observer = self
            .participants
            .get_mut(observer_id.as_str())
            .ok_or_else(|| RoomError::ParticipantNotFound(observer_id.as_str().to_string()))?;
        observer.observing = target_id;
        Ok(())
    }

    /// Deliver a message to every member except `exclude`.
    ///
    /// Pushes into each member's outbound channel; a failed push means the
    /// receiving connection is gone, so the member's id is returned for the
    /// caller to treat as an implicit disconnect. The broadcast itself always
    /// runs to completion.
    pub fn broadcast(&self, message: &str, exclude: Option<&UserId>) -> Vec<UserId> {
        let mut failed = Vec::new();
        for participant in self.participants.values() {
            if let Some(excluded) = exclude
                && participant.id == *excluded
            {
                continue;
            }
            if participant.sender.send(message.to_string()).is_err() {
                failed.push(participant.id.clone());
            }
        }
        failed
    }

    /// Get a participant by user id
    pub fn get_participant(&self, user_id: &UserId) -> Option<&Participant> {
        self.participants.get(user_id.as_str())
    }

    /// Number of current members
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// True iff no members remain
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Presence record of one room member.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Participant identifier
    pub id: UserId,
    /// Display name
    pub username: Username,
    /// Timestamp when the participant joined
    pub joined_at: Timestamp,
    /// True for the room creator
    pub is_owner: bool,
    /// Declared observation target, if any
    pub observing: Option<UserId>,
    /// Outbound channel feeding this member's socket writer task
    pub sender: UnboundedSender<String>,
}

impl Participant {
    /// Create a new participant presence record
    pub fn new(
        id: UserId,
        username: Username,
        joined_at: Timestamp,
        is_owner: bool,
        sender: UnboundedSender<String>,
    ) -> Self {
        Self {
            id,
            username,
            joined_at,
            is_owner,
            observing: None,
            sender,
        }
    }
}

/// Shared document state: a single code blob plus a file mapping.
///
/// Writes fully replace the prior value (no merge, no version check).
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    /// Single-blob code content
    pub code: String,
    /// Per-file content keyed by file path
    pub files: HashMap<String, String>,
    /// Path of the most recently written file, if any
    pub active_file: Option<String>,
}

impl SharedState {
    /// Apply a last-writer-wins content update
    pub fn apply(&mut self, code: String, file_path: Option<String>) {
        match file_path {
            Some(path) => {
                self.files.insert(path.clone(), code);
                self.active_file = Some(path);
            }
            None => self.code = code,
        }
    }
}
