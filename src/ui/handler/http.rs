//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    common::time::timestamp_to_rfc3339,
    domain::{RoomId, UserId, Username},
    infrastructure::dto::http::{
        CreateRoomRequest, CreateRoomResponse, ParticipantDetailDto, RoomDetailDto, RoomSummaryDto,
    },
    ui::state::AppState,
    usecase::CreateRoomUseCase,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a room and hand the creator its shareable join link.
///
/// Creation does not admit the creator; they join over the websocket with
/// the returned link like everyone else.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), StatusCode> {
    let owner_id = UserId::new(request.owner_id).map_err(|e| {
        tracing::warn!("Rejected room creation: {}", e);
        StatusCode::BAD_REQUEST
    })?;
    let owner_username = Username::new(request.owner_username).map_err(|e| {
        tracing::warn!("Rejected room creation: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let usecase = CreateRoomUseCase::new(state.registry.clone());
    let output = usecase.execute(owner_id.clone(), owner_username).await;

    let response = CreateRoomResponse {
        room_id: output.room_id.into_string(),
        join_link: output.join_link,
        owner_id: owner_id.into_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get the list of live rooms.
///
/// Summaries never carry join tokens; the token is only in the creator's
/// join link.
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let mut summaries: Vec<RoomSummaryDto> = state
        .registry
        .list_active_rooms()
        .await
        .into_iter()
        .map(|summary| RoomSummaryDto {
            room_id: summary.room_id.into_string(),
            participant_count: summary.participant_count,
            created_at: timestamp_to_rfc3339(summary.created_at.value()),
        })
        .collect();

    // Sort by room_id for consistent ordering
    summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));

    Json(summaries)
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    let detail = state
        .registry
        .room_detail(&room_id)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    let mut participants: Vec<ParticipantDetailDto> = detail
        .participants
        .into_iter()
        .map(|p| ParticipantDetailDto {
            user_id: p.user_id.into_string(),
            username: p.username.into_string(),
            joined_at: timestamp_to_rfc3339(p.joined_at.value()),
            is_owner: p.is_owner,
        })
        .collect();
    participants.sort_by(|a, b| a.user_id.cmp(&b.user_id));

    Ok(Json(RoomDetailDto {
        room_id: detail.room_id.into_string(),
        participant_count: participants.len(),
        participants,
        created_at: timestamp_to_rfc3339(detail.created_at.value()),
    }))
}
