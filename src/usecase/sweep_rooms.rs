//! UseCase: stale room sweep.

use std::sync::Arc;

use crate::domain::{STALE_ROOM_RETENTION_MS, SessionRegistry};

/// Stale room sweep use case, driven by the periodic background task.
///
/// Removes rooms that have been empty past the retention window. A join in
/// flight wins: the registry re-checks emptiness under lock before deleting.
pub struct SweepRoomsUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl SweepRoomsUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Run one sweep with the default retention window; returns how many
    /// rooms were removed.
    pub async fn execute(&self) -> usize {
        self.registry.sweep_stale_rooms(STALE_ROOM_RETENTION_MS).await
    }
}
