//! UseCase: room creation.

use std::sync::Arc;

use crate::domain::{RoomId, SessionRegistry, UserId, Username};

/// Path prefix of shareable join links. The token is the last segment.
pub const JOIN_PATH_PREFIX: &str = "/collab/";

/// What the creator gets back: the public room id and the shareable link.
///
/// The link embeds the admission token, so it must be shown only to the
/// creator and never logged or listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRoomOutput {
    pub room_id: RoomId,
    pub join_link: String,
}

/// Room creation use case.
pub struct CreateRoomUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl CreateRoomUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Create a room owned by the given user and mint its join link.
    ///
    /// Creation does not admit anyone; the owner joins over a websocket like
    /// every other participant.
    pub async fn execute(&self, owner_id: UserId, owner_username: Username) -> CreatedRoomOutput {
        let created = self.registry.create_room(owner_id, owner_username).await;
        let join_link = format!("{}{}", JOIN_PATH_PREFIX, created.join_token.as_str());
        CreatedRoomOutput {
            room_id: created.room_id,
            join_link,
        }
    }
}
