use time::Duration;
use tokio::task::AbortHandle;

use crate::services::exam_sessions::WeakSessionStore;

/// Spawns the one-shot timer that expires a timer-mode session after `delay`.
///
/// The returned handle lets submit cancel the sleep; the transition itself is still
/// guarded by the store, so a timer that fires late changes nothing.
pub(crate) fn schedule(
    store: WeakSessionStore,
    session_id: String,
    delay: Duration,
) -> AbortHandle {
    let delay = delay.unsigned_abs();

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let Some(store) = store.upgrade() else {
            tracing::debug!(session_id = %session_id, "Session store dropped before expiry fired");
            return;
        };

        if !store.expire(&session_id).await {
            tracing::debug!(
                session_id = %session_id,
                "Expiry fired for a session that is no longer active"
            );
        }
    })
    .abort_handle()
}
