//! HTTP API request/response DTOs.
//!
//! None of the listing/introspection DTOs has a join token field: the token
//! travels only inside the `join_link` returned at creation time.

use serde::{Deserialize, Serialize};

/// Request body for room creation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRoomRequest {
    pub owner_id: String,
    pub owner_username: String,
}

/// Response for room creation; the `join_link` embeds the join token and
/// must be treated as a secret credential by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub join_link: String,
    pub owner_id: String,
}

/// Room summary for the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub room_id: String,
    pub participant_count: usize,
    pub created_at: String, // ISO 8601
}

/// Room detail for the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub room_id: String,
    pub participant_count: usize,
    pub participants: Vec<ParticipantDetailDto>,
    pub created_at: String, // ISO 8601
}

/// Participant detail for the room detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub user_id: String,
    pub username: String,
    pub joined_at: String, // ISO 8601
    pub is_owner: bool,
}
