//! UseCase: shared code updates (last-writer-wins).

use std::sync::Arc;

use crate::domain::{RegistryError, SessionRegistry, UserId};

use super::drain::disconnect_failed;

/// Code update use case.
pub struct UpdateCodeUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl UpdateCodeUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Replace the shared document state and fan the update out to the other
    /// members. The sender gets no echo.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ParticipantNotFound` if the sender is not in
    /// a room.
    pub async fn execute(
        &self,
        user_id: &UserId,
        code: String,
        file_path: Option<String>,
    ) -> Result<(), RegistryError> {
        let outcome = self
            .registry
            .update_shared_state(user_id, code, file_path)
            .await?;
        if !outcome.failed_sends.is_empty() {
            disconnect_failed(self.registry.as_ref(), outcome.failed_sends).await;
        }
        Ok(())
    }
}
