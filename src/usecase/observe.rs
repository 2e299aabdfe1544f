//! UseCase: observation mode (watch another member's work).

use std::sync::Arc;

use crate::domain::{RegistryError, SessionRegistry, UserId};

use super::drain::disconnect_failed;

/// Observation mode use case.
pub struct ObserveUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl ObserveUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Set or clear (target `None`) the observer's target and notify every
    /// member of the room, the observer included, so all clients can render
    /// the observation indicator.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ParticipantNotFound` if the observer is not in
    /// a room.
    pub async fn execute(
        &self,
        observer_id: &UserId,
        target_id: Option<UserId>,
    ) -> Result<(), RegistryError> {
        let outcome = self.registry.set_observation(observer_id, target_id).await?;
        if !outcome.failed_sends.is_empty() {
            disconnect_failed(self.registry.as_ref(), outcome.failed_sends).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Username;
    use crate::infrastructure::registry::InMemorySessionRegistry;
    use crate::usecase::{create_room::CreateRoomUseCase, join_room::JoinRoomUseCase};
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn name(n: &str) -> Username {
        Username::new(n.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_observe_notifies_all_members() {
        // テスト項目: 観察モード変更が本人を含む全メンバーに届く
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let created = CreateRoomUseCase::new(registry.clone())
            .execute(user("alice"), name("Alice"))
            .await;
        let join = JoinRoomUseCase::new(registry.clone());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        join.execute(&created.join_link, user("alice"), name("Alice"), tx_a)
            .await
            .unwrap();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        join.execute(&created.join_link, user("bob"), name("Bob"), tx_b)
            .await
            .unwrap();
        rx_a.try_recv().unwrap(); // init
        rx_a.try_recv().unwrap(); // bob の user_joined
        rx_b.try_recv().unwrap(); // init

        // when (操作): bob が alice を観察する
        ObserveUseCase::new(registry)
            .execute(&user("bob"), Some(user("alice")))
            .await
            .unwrap();

        // then (期待する結果):
        for rx in [&mut rx_a, &mut rx_b] {
            let changed = rx.try_recv().unwrap();
            assert!(changed.contains(r#""type":"observation_changed""#));
            assert!(changed.contains(r#""target_id":"alice""#));
        }
    }

    #[tokio::test]
    async fn test_observe_clear_omits_target() {
        // テスト項目: 観察解除の通知には target_id が含まれない
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let created = CreateRoomUseCase::new(registry.clone())
            .execute(user("alice"), name("Alice"))
            .await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        JoinRoomUseCase::new(registry.clone())
            .execute(&created.join_link, user("alice"), name("Alice"), tx)
            .await
            .unwrap();
        rx.try_recv().unwrap(); // init

        // when (操作):
        ObserveUseCase::new(registry)
            .execute(&user("alice"), None)
            .await
            .unwrap();

        // then (期待する結果):
        let changed = rx.try_recv().unwrap();
        assert!(changed.contains(r#""type":"observation_changed""#));
        assert!(!changed.contains("target_id"));
    }
}
