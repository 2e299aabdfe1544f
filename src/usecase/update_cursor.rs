//! UseCase: cursor position updates.

use std::sync::Arc;

use crate::domain::{CursorPosition, RegistryError, SessionRegistry, UserId};

use super::drain::disconnect_failed;

/// Cursor update use case.
pub struct UpdateCursorUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl UpdateCursorUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Record a member's cursor position and fan it out to the other members.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ParticipantNotFound` if the sender is not in
    /// a room.
    pub async fn execute(
        &self,
        user_id: &UserId,
        position: CursorPosition,
    ) -> Result<(), RegistryError> {
        let outcome = self.registry.update_cursor(user_id, position).await?;
        if !outcome.failed_sends.is_empty() {
            disconnect_failed(self.registry.as_ref(), outcome.failed_sends).await;
        }
        Ok(())
    }
}
