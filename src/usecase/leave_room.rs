//! UseCase: participant departure.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{SessionRegistry, UserId};

use super::drain::disconnect_failed;

/// Participant departure use case.
///
/// Covers explicit leaves, socket closes and read errors alike; removal is
/// exactly-once, so whichever path runs first wins and the others are no-ops.
pub struct LeaveRoomUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl LeaveRoomUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Remove a participant from their room.
    ///
    /// Returns true if this call performed the removal, false if the
    /// participant was already gone.
    pub async fn execute(&self, user_id: &UserId) -> bool {
        match self.registry.remove_participant(user_id).await {
            Ok(outcome) => {
                if outcome.room_removed {
                    debug!("Room '{}' emptied and was removed", outcome.room_id);
                }
                if !outcome.failed_sends.is_empty() {
                    disconnect_failed(self.registry.as_ref(), outcome.failed_sends).await;
                }
                true
            }
            Err(_) => false,
        }
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
    async fn test_leave_room_removes_participant_once() {
        // テスト項目: 退室は正確に1回だけ実行される（2回目は no-op）
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let created = CreateRoomUseCase::new(registry.clone())
            .execute(user("alice"), name("Alice"))
            .await;
        let (tx, _rx) = mpsc::unbounded_channel();
        JoinRoomUseCase::new(registry.clone())
            .execute(&created.join_link, user("alice"), name("Alice"), tx)
            .await
            .unwrap();
        let usecase = LeaveRoomUseCase::new(registry.clone());

        // when (操作):
        let first = usecase.execute(&user("alice")).await;
        let second = usecase.execute(&user("alice")).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_leave_room_drains_dead_remaining_members() {
        // テスト項目: 退室通知が配信できない残存メンバーも連鎖的に退室する
        // given (前提条件): bob の受信側が閉じている2人部屋
        let registry = Arc::new(InMemorySessionRegistry::new());
        let created = CreateRoomUseCase::new(registry.clone())
            .execute(user("alice"), name("Alice"))
            .await;
        let join = JoinRoomUseCase::new(registry.clone());
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        join.execute(&created.join_link, user("alice"), name("Alice"), tx_a)
            .await
            .unwrap();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        join.execute(&created.join_link, user("bob"), name("Bob"), tx_b)
            .await
            .unwrap();
        drop(rx_b);

        // when (操作): alice が退室（bob への user_left 配信が失敗する）
        LeaveRoomUseCase::new(registry.clone())
            .execute(&user("alice"))
            .await;

        // then (期待する結果): bob も退室し、空になったルームは消える
        assert_eq!(registry.room_count().await, 0);
    }
}
