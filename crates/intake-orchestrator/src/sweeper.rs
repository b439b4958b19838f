//! Background expiry of idle sessions.

use std::sync::Arc;
use std::time::Duration;

use claim_core::ContextStore;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Spawn a task that sweeps `store` every `period`.
///
/// The task runs until the returned handle is aborted.
pub fn spawn_session_sweeper(store: Arc<ContextStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.sweep_expired().await;
            debug!(
                "Session sweep removed {} contexts ({} remaining)",
                removed,
                store.count().await
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweeper_removes_idle_sessions() {
        let store = Arc::new(ContextStore::with_ttl(Duration::from_millis(50)));
        store.get("idle").await;
        assert_eq!(store.count().await, 1);

        let handle = spawn_session_sweeper(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_abort_stops_sweeping() {
        let store = Arc::new(ContextStore::with_ttl(Duration::from_millis(10)));
        let handle = spawn_session_sweeper(store.clone(), Duration::from_millis(20));
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        store.get("kept").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.count().await, 1);
    }
}
