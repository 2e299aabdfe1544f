//! Implicit-disconnect drain.
//!
//! A failed channel push during a broadcast means the receiving connection is
//! already gone. Whichever operation observed the failure removes those
//! participants here, and the departure notifications that removal triggers
//! can in turn surface more dead connections, so the drain loops until no
//! failures remain.

use tracing::debug;

use crate::domain::{SessionRegistry, UserId};

/// Remove every participant whose outbound channel rejected a push.
///
/// Removal is exactly-once in the registry, so a user surfacing twice in the
/// queue is dropped on the second pass and the loop always terminates.
pub async fn disconnect_failed(registry: &dyn SessionRegistry, mut failed: Vec<UserId>) {
    while let Some(user_id) = failed.pop() {
        match registry.remove_participant(&user_id).await {
            Ok(outcome) => {
                debug!("Dropped '{}' after failed delivery", user_id);
                failed.extend(outcome.failed_sends);
            }
            // Already removed by a racing disconnect; nothing left to do
            Err(_) => continue,
        }
    }
}
