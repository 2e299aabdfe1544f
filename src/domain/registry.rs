//! Session registry seam.
//!
//! The registry is the single source of truth mapping room identifiers and
//! join tokens to live rooms, and the only component allowed to create or
//! destroy them. The trait lives in the domain layer so use cases depend on
//! the abstraction, not on the in-memory implementation (dependency
//! inversion).

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    error::RegistryError,
    value_object::{CursorPosition, JoinToken, RoomId, Timestamp, UserId, Username},
};

/// How long an empty room may linger before the periodic sweep removes it.
pub const STALE_ROOM_RETENTION_MS: i64 = 24 * 60 * 60 * 1000;

/// Result of `create_room`: the only place a join token leaves the registry.
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub room_id: RoomId,
    pub owner_id: UserId,
    pub join_token: JoinToken,
    pub created_at: Timestamp,
}

/// Result of a successful `register_participant`.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub room_id: RoomId,
    /// Members whose channel push failed during the join broadcast
    pub failed_sends: Vec<UserId>,
}

/// Result of `remove_participant`.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub room_id: RoomId,
    /// True if the departure emptied the room and it was deleted
    pub room_removed: bool,
    /// Members whose channel push failed during the departure broadcast
    pub failed_sends: Vec<UserId>,
}

/// Result of a state-mutating broadcast operation.
#[derive(Debug, Clone, Default)]
pub struct BroadcastOutcome {
    /// Members whose channel push failed; each is an implicit disconnect
    pub failed_sends: Vec<UserId>,
}

/// One row of `list_active_rooms`. Deliberately has no token field.
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub participant_count: usize,
    pub created_at: Timestamp,
}

/// Presence data exposed by `room_detail`.
#[derive(Debug, Clone)]
pub struct ParticipantInfo {
    pub user_id: UserId,
    pub username: Username,
    pub joined_at: Timestamp,
    pub is_owner: bool,
    pub observing: Option<UserId>,
}

/// Result of `room_detail`. Deliberately has no token field.
#[derive(Debug, Clone)]
pub struct RoomDetail {
    pub room_id: RoomId,
    pub created_at: Timestamp,
    pub participants: Vec<ParticipantInfo>,
}

/// Registry of all live collaboration rooms.
///
/// Mutating operations on one room are serialized behind that room's lock;
/// operations on different rooms proceed independently. Implementations push
/// resulting events into member channels while the room lock is held, so
/// per-connection delivery order matches the order operations were applied.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Allocate and index a new room. Always succeeds.
    async fn create_room(&self, owner_id: UserId, owner_username: Username) -> CreatedRoom;

    /// Resolve a join token to a room id. The sole admission path.
    async fn resolve_token(&self, token: &JoinToken) -> Result<RoomId, RegistryError>;

    /// Admit a participant into a room and associate their connection.
    ///
    /// On success the joiner's channel has already received the `init`
    /// snapshot and every other member a `user_joined` event, in that same
    /// room-lock hold, so the snapshot can never miss a concurrent update.
    async fn register_participant(
        &self,
        room_id: &RoomId,
        user_id: UserId,
        username: Username,
        sender: UnboundedSender<String>,
    ) -> Result<JoinOutcome, RegistryError>;

    /// Remove a participant from their current room; deletes the room (and
    /// invalidates its token) when it empties.
    async fn remove_participant(&self, user_id: &UserId) -> Result<LeaveOutcome, RegistryError>;

    /// Last-writer-wins update of the shared document state.
    async fn update_shared_state(
        &self,
        user_id: &UserId,
        code: String,
        file_path: Option<String>,
    ) -> Result<BroadcastOutcome, RegistryError>;

    /// Overwrite a member's cursor position.
    async fn update_cursor(
        &self,
        user_id: &UserId,
        position: CursorPosition,
    ) -> Result<BroadcastOutcome, RegistryError>;

    /// Set or clear a member's observation target.
    async fn set_observation(
        &self,
        observer_id: &UserId,
        target_id: Option<UserId>,
    ) -> Result<BroadcastOutcome, RegistryError>;

    /// Summaries of all live rooms. Never includes join tokens.
    async fn list_active_rooms(&self) -> Vec<RoomSummary>;

    /// Presence detail for one room. Never includes the join token.
    async fn room_detail(&self, room_id: &RoomId) -> Result<RoomDetail, RegistryError>;

    /// Remove all rooms that are both empty and older than `retention_ms`.
    /// Idempotent; returns the number of rooms removed.
    async fn sweep_stale_rooms(&self, retention_ms: i64) -> usize;

    /// Number of live rooms.
    async fn room_count(&self) -> usize;
}
