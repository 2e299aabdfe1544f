//! UseCase: room admission via join link.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{JoinToken, RoomId, SessionRegistry, UserId, Username};

use super::{drain::disconnect_failed, error::JoinError};

/// Room admission use case.
///
/// Resolves a join link to a room and registers the participant; the joiner's
/// init snapshot and the `user_joined` notification to the others are pushed
/// by the registry as part of admission.
pub struct JoinRoomUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl JoinRoomUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Admit a participant through a join link.
    ///
    /// # Arguments
    ///
    /// * `join_link` - shareable link ("/collab/{token}", a full URL ending in
    ///   the token, or the bare token itself)
    /// * `sender` - outbound channel feeding this connection's socket writer
    ///
    /// # Errors
    ///
    /// Returns `JoinError` if the link cannot be parsed, the token matches no
    /// live room, the room is full, or the user is already in a room.
    pub async fn execute(
        &self,
        join_link: &str,
        user_id: UserId,
        username: Username,
        sender: UnboundedSender<String>,
    ) -> Result<RoomId, JoinError> {
        let token = parse_join_link(join_link)?;
        let room_id = self.registry.resolve_token(&token).await?;

        let outcome = self
            .registry
            .register_participant(&room_id, user_id, username, sender)
            .await?;

        if !outcome.failed_sends.is_empty() {
            disconnect_failed(self.registry.as_ref(), outcome.failed_sends).await;
        }
        Ok(outcome.room_id)
    }
}

/// Extract the admission token from a join link.
///
/// The token is the last non-empty path segment, so "/collab/{token}", a full
/// URL and a bare token all parse. Query strings are not part of the format.
fn parse_join_link(join_link: &str) -> Result<JoinToken, JoinError> {
    let token = join_link
        .trim()
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .ok_or(JoinError::InvalidJoinLink)?;
    JoinToken::new(token.to_string()).map_err(|_| JoinError::InvalidJoinLink)
}
