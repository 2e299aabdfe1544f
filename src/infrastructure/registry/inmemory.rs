//! In-memory SessionRegistry implementation.
//!
//! All live rooms are held in process memory, owned by this registry object
//! (no ambient module-level state). Locking is layered:
//!
//! - the `rooms`, `tokens` and `members` indexes each sit behind their own
//!   `RwLock`, held only for brief lookups and never across socket I/O;
//! - each room sits behind its own `Mutex`, so operations on one room are
//!   mutually exclusive while different rooms proceed independently.
//!
//! Event fan-out pushes into per-connection unbounded channels while the room
//! lock is held; the push never blocks, and the actual socket write happens
//! in the connection's forwarding task. This keeps per-connection delivery
//! order aligned with the order operations were applied to the room.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, mpsc::UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    common::time::get_timestamp_ms,
    domain::{
        BroadcastOutcome, CreatedRoom, CursorPosition, JoinOutcome, JoinToken, JoinTokenFactory,
        LeaveOutcome, Participant, ParticipantInfo, RegistryError, Room, RoomDetail, RoomError,
        RoomId, RoomIdFactory, RoomSummary, SessionRegistry, Timestamp, UserId, Username,
    },
    infrastructure::dto::websocket::{
        CodeUpdateMessage, CursorDto, CursorUpdateMessage, InitMessage, MessageType,
        ObservationChangedMessage, SharedStateDto, UserDto, UserJoinedMessage, UserLeftMessage,
    },
};

/// Registry-side record of one live room.
struct RoomEntry {
    /// Duplicated from the room so the sweep can judge staleness without
    /// taking the room lock
    created_at: Timestamp,
    room: Arc<Mutex<Room>>,
}

/// In-memory session registry.
///
/// The single source of truth for room and token indexes; the only component
/// that creates or destroys rooms.
#[derive(Default)]
pub struct InMemorySessionRegistry {
    /// room_id -> room
    rooms: RwLock<HashMap<String, RoomEntry>>,
    /// join_token -> room_id
    tokens: RwLock<HashMap<String, String>>,
    /// user_id -> room_id (reverse index; also the occupancy source for the
    /// sweep and the listing, so neither takes room locks)
    members: RwLock<HashMap<String, String>>,
}

impl InMemorySessionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a join token that is unique across all live rooms
    async fn mint_unique_token(&self) -> JoinToken {
        let tokens = self.tokens.read().await;
        loop {
            if let Ok(token) = JoinTokenFactory::generate()
                && !tokens.contains_key(token.as_str())
            {
                return token;
            }
        }
    }

    /// Brief `rooms` read lock to clone the room handle
    async fn room_arc(&self, room_id: &str) -> Option<Arc<Mutex<Room>>> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map(|entry| entry.room.clone())
    }

    /// Delete a room if it is (still) empty; invalidates its token mapping.
    ///
    /// Emptiness is re-checked under the `rooms` write lock so a join racing
    /// with the deletion either lands before the removal or observes the
    /// `closed` flag and is rejected.
    async fn delete_room_if_empty(&self, room_id: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(entry) = rooms.get(room_id) else {
            return false;
        };
        let token = {
            let mut room = entry.room.lock().await;
            if !room.is_empty() || room.closed {
                return false;
            }
            room.closed = true;
            room.join_token.as_str().to_string()
        };
        rooms.remove(room_id);
        drop(rooms);

        self.tokens.write().await.remove(&token);
        info!("Removed empty room '{}' and invalidated its token", room_id);
        true
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn create_room(&self, owner_id: UserId, owner_username: Username) -> CreatedRoom {
        let room_id = RoomIdFactory::generate().expect("UUID v4 room ids are always valid");
        let join_token = self.mint_unique_token().await;
        let created_at = Timestamp::new(get_timestamp_ms());

        let room = Room::new(
            room_id.clone(),
            owner_id.clone(),
            join_token.clone(),
            created_at,
        );

        {
            let mut rooms = self.rooms.write().await;
            rooms.insert(
                room_id.as_str().to_string(),
                RoomEntry {
                    created_at,
                    room: Arc::new(Mutex::new(room)),
                },
            );
        }
        {
            let mut tokens = self.tokens.write().await;
            tokens.insert(join_token.as_str().to_string(), room_id.as_str().to_string());
        }

        info!(
            "Created room '{}' for owner '{}' ({})",
            room_id, owner_id, owner_username
        );

        CreatedRoom {
            room_id,
            owner_id,
            join_token,
            created_at,
        }
    }

    async fn resolve_token(&self, token: &JoinToken) -> Result<RoomId, RegistryError> {
        let tokens = self.tokens.read().await;
        let room_id = tokens
            .get(token.as_str())
            .ok_or(RegistryError::RoomNotFound)?;
        RoomId::new(room_id.clone()).map_err(|_| RegistryError::RoomNotFound)
    }

    async fn register_participant(
        &self,
        room_id: &RoomId,
        user_id: UserId,
        username: Username,
        sender: UnboundedSender<String>,
    ) -> Result<JoinOutcome, RegistryError> {
        // One room per user: reserve the id in the reverse index up front,
        // so two concurrent joins with the same user id cannot both pass.
        // The write lock is released before the room mutex is taken, keeping
        // joins into different rooms independent of each other; admission
        // failure rolls the reservation back.
        {
            let mut members = self.members.write().await;
            if members.contains_key(user_id.as_str()) {
                return Err(RegistryError::AlreadyJoined(user_id.as_str().to_string()));
            }
            members.insert(user_id.as_str().to_string(), room_id.as_str().to_string());
        }

        match self.admit(room_id, &user_id, username, sender).await {
            Ok(failed_sends) => {
                debug!("Registered '{}' in room '{}'", user_id, room_id);
                Ok(JoinOutcome {
                    room_id: room_id.clone(),
                    failed_sends,
                })
            }
            Err(e) => {
                self.members.write().await.remove(user_id.as_str());
                Err(e)
            }
        }
    }

    async fn remove_participant(&self, user_id: &UserId) -> Result<LeaveOutcome, RegistryError> {
        // Removing the reverse-index entry first doubles as the idempotency
        // guard: a read error and an explicit close racing each other still
        // remove the participant exactly once.
        let room_id = {
            let mut members = self.members.write().await;
            members
                .remove(user_id.as_str())
                .ok_or_else(|| RegistryError::ParticipantNotFound(user_id.as_str().to_string()))?
        };

        let Some(room_arc) = self.room_arc(&room_id).await else {
            // Room already deleted (e.g. by a concurrent sweep)
            let room_id = RoomId::new(room_id).map_err(|_| RegistryError::RoomNotFound)?;
            return Ok(LeaveOutcome {
                room_id,
                room_removed: true,
                failed_sends: Vec::new(),
            });
        };

        let (empty, failed_sends) = {
            let mut room = room_arc.lock().await;
            room.remove_participant(user_id);

            let failed = if room.is_empty() {
                Vec::new()
            } else {
                let left = UserLeftMessage {
                    r#type: MessageType::UserLeft,
                    user_id: user_id.as_str().to_string(),
                    total_users: room.participant_count(),
                };
                match serialize(&left) {
                    Some(json) => room.broadcast(&json, None),
                    None => Vec::new(),
                }
            };
            (room.is_empty(), failed)
        };

        let room_removed = if empty {
            self.delete_room_if_empty(&room_id).await
        } else {
            false
        };

        debug!("Removed '{}' from room '{}'", user_id, room_id);
        let room_id = RoomId::new(room_id).map_err(|_| RegistryError::RoomNotFound)?;
        Ok(LeaveOutcome {
            room_id,
            room_removed,
            failed_sends,
        })
    }

    async fn update_shared_state(
        &self,
        user_id: &UserId,
        code: String,
        file_path: Option<String>,
    ) -> Result<BroadcastOutcome, RegistryError> {
        let room_arc = self.member_room(user_id).await?;
        let mut room = room_arc.lock().await;

        let username = room
            .get_participant(user_id)
            .map(|p| p.username.as_str().to_string())
            .ok_or_else(|| RegistryError::ParticipantNotFound(user_id.as_str().to_string()))?;

        room.apply_code_update(user_id, code.clone(), file_path.clone())
            .map_err(|_| RegistryError::ParticipantNotFound(user_id.as_str().to_string()))?;

        let update = CodeUpdateMessage {
            r#type: MessageType::CodeUpdate,
            user_id: user_id.as_str().to_string(),
            username,
            code,
            file_path,
            timestamp: get_timestamp_ms(),
        };
        let failed_sends = match serialize(&update) {
            Some(json) => room.broadcast(&json, Some(user_id)),
            None => Vec::new(),
        };
        Ok(BroadcastOutcome { failed_sends })
    }

    async fn update_cursor(
        &self,
        user_id: &UserId,
        position: CursorPosition,
    ) -> Result<BroadcastOutcome, RegistryError> {
        let room_arc = self.member_room(user_id).await?;
        let mut room = room_arc.lock().await;

        room.set_cursor(user_id, position)
            .map_err(|_| RegistryError::ParticipantNotFound(user_id.as_str().to_string()))?;

        let update = CursorUpdateMessage {
            r#type: MessageType::CursorUpdate,
            cursor: CursorDto {
                user_id: user_id.as_str().to_string(),
                line: position.line,
                column: position.column,
            },
        };
        let failed_sends = match serialize(&update) {
            Some(json) => room.broadcast(&json, Some(user_id)),
            None => Vec::new(),
        };
        Ok(BroadcastOutcome { failed_sends })
    }

    async fn set_observation(
        &self,
        observer_id: &UserId,
        target_id: Option<UserId>,
    ) -> Result<BroadcastOutcome, RegistryError> {
        let room_arc = self.member_room(observer_id).await?;
        let mut room = room_arc.lock().await;

        room.set_observation(observer_id, target_id.clone())
            .map_err(|_| RegistryError::ParticipantNotFound(observer_id.as_str().to_string()))?;

        // Everyone renders observation indicators, so no exclusion here
        let changed = ObservationChangedMessage {
            r#type: MessageType::ObservationChanged,
            observer_id: observer_id.as_str().to_string(),
            target_id: target_id.map(UserId::into_string),
        };
        let failed_sends = match serialize(&changed) {
            Some(json) => room.broadcast(&json, None),
            None => Vec::new(),
        };
        Ok(BroadcastOutcome { failed_sends })
    }

    async fn list_active_rooms(&self) -> Vec<RoomSummary> {
        // Occupancy comes from the reverse index; no room lock is taken
        let counts: HashMap<String, usize> = {
            let members = self.members.read().await;
            let mut counts: HashMap<String, usize> = HashMap::new();
            for room_id in members.values() {
                *counts.entry(room_id.clone()).or_default() += 1;
            }
            counts
        };

        let rooms = self.rooms.read().await;
        rooms
            .iter()
            .filter_map(|(room_id, entry)| {
                let room_id = RoomId::new(room_id.clone()).ok()?;
                Some(RoomSummary {
                    participant_count: counts.get(room_id.as_str()).copied().unwrap_or(0),
                    created_at: entry.created_at,
                    room_id,
                })
            })
            .collect()
    }

    async fn room_detail(&self, room_id: &RoomId) -> Result<RoomDetail, RegistryError> {
        let room_arc = self
            .room_arc(room_id.as_str())
            .await
            .ok_or(RegistryError::RoomNotFound)?;
        let room = room_arc.lock().await;

        let participants = room
            .participants
            .values()
            .map(|p| ParticipantInfo {
                user_id: p.id.clone(),
                username: p.username.clone(),
                joined_at: p.joined_at,
                is_owner: p.is_owner,
                observing: p.observing.clone(),
            })
            .collect();

        Ok(RoomDetail {
            room_id: room.id.clone(),
            created_at: room.created_at,
            participants,
        })
    }

    async fn sweep_stale_rooms(&self, retention_ms: i64) -> usize {
        let now = get_timestamp_ms();

        let occupied: HashSet<String> = {
            let members = self.members.read().await;
            members.values().cloned().collect()
        };

        // Candidates are judged from registry-side data only; rooms the
        // sweep retains never have their lock taken.
        let candidates: Vec<String> = {
            let rooms = self.rooms.read().await;
            rooms
                .iter()
                .filter(|(room_id, entry)| {
                    !occupied.contains(*room_id)
                        && now - entry.created_at.value() > retention_ms
                })
                .map(|(room_id, _)| room_id.clone())
                .collect()
        };

        let mut removed = 0;
        for room_id in candidates {
            if self.delete_room_if_empty(&room_id).await {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Sweep removed {} stale room(s)", removed);
        }
        removed
    }

    async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl InMemorySessionRegistry {
    /// Admit a reserved participant into their room and push the join events.
    ///
    /// A racing room deletion is safe: `delete_room_if_empty` sets `closed`
    /// under the room lock, so a join landing afterwards is rejected here.
    async fn admit(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        username: Username,
        sender: UnboundedSender<String>,
    ) -> Result<Vec<UserId>, RegistryError> {
        let room_arc = self
            .room_arc(room_id.as_str())
            .await
            .ok_or(RegistryError::RoomNotFound)?;
        let mut room = room_arc.lock().await;

        let is_owner = room.owner_id == *user_id;
        let participant = Participant::new(
            user_id.clone(),
            username,
            Timestamp::new(get_timestamp_ms()),
            is_owner,
            sender,
        );
        let joined_dto = user_dto(&participant);
        room.add_participant(participant).map_err(|e| match e {
            RoomError::CapacityExceeded { capacity, .. } => RegistryError::RoomFull { capacity },
            _ => RegistryError::RoomNotFound,
        })?;

        // Notify existing members first, then hand the joiner the snapshot;
        // both pushed under this lock hold so the snapshot cannot miss a
        // concurrent update.
        let joined = UserJoinedMessage {
            r#type: MessageType::UserJoined,
            user: joined_dto,
            total_users: room.participant_count(),
        };
        let mut failed_sends = match serialize(&joined) {
            Some(json) => room.broadcast(&json, Some(user_id)),
            None => Vec::new(),
        };

        let init = init_message(&room);
        if let Some(json) = serialize(&init)
            && let Some(me) = room.get_participant(user_id)
            && me.sender.send(json).is_err()
        {
            // The joiner's connection died mid-admission; let the
            // failed-send drain remove them like any broken connection.
            failed_sends.push(user_id.clone());
        }
        Ok(failed_sends)
    }

    /// Resolve a member's current room handle via the reverse index
    async fn member_room(&self, user_id: &UserId) -> Result<Arc<Mutex<Room>>, RegistryError> {
        let room_id = {
            let members = self.members.read().await;
            members
                .get(user_id.as_str())
                .cloned()
                .ok_or_else(|| RegistryError::ParticipantNotFound(user_id.as_str().to_string()))?
        };
        self.room_arc(&room_id)
            .await
            .ok_or(RegistryError::RoomNotFound)
    }
}

fn user_dto(participant: &Participant) -> UserDto {
    UserDto {
        user_id: participant.id.as_str().to_string(),
        username: participant.username.as_str().to_string(),
        joined_at: participant.joined_at.value(),
        is_owner: participant.is_owner,
        observing: participant
            .observing
            .as_ref()
            .map(|id| id.as_str().to_string()),
    }
}

fn init_message(room: &Room) -> InitMessage {
    InitMessage {
        r#type: MessageType::Init,
        room_id: room.id.as_str().to_string(),
        users: room.participants.values().map(user_dto).collect(),
        shared_state: SharedStateDto {
            code: room.shared_state.code.clone(),
            files: room.shared_state.files.clone(),
            active_file: room.shared_state.active_file.clone(),
        },
        cursors: room
            .cursors
            .iter()
            .map(|(user_id, position)| {
                (
                    user_id.clone(),
                    CursorDto {
                        user_id: user_id.clone(),
                        line: position.line,
                        column: position.column,
                    },
                )
            })
            .collect(),
    }
}

fn serialize<T: Serialize>(message: &T) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!("Failed to serialize broadcast message: {}", e);
            None
        }
    }
}
