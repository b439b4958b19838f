//! Per-session conversation state with idle expiry.

use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use indexmap::map::Entry as MapEntry;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::schema::{ConversationContext, HistoryEntry};

/// Idle time after which a session is swept (30 minutes).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Entry {
    context: ConversationContext,
    last_accessed: Instant,
}

/// Shared map from session id to [`ConversationContext`].
///
/// Every read or write refreshes the session's last-access time. Entries are
/// kept in access order, so the least recently used session is always first
/// and a sweep only has to look at the front of the map.
///
/// # Example
///
/// ```rust
/// use claim_core::ContextStore;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = ContextStore::new();
///
///     let mut context = store.get("call-1").await;
///     context.policy_id = Some("POL-1".to_string());
///     store.save(context).await;
///
///     assert_eq!(store.get("call-1").await.policy_id.as_deref(), Some("POL-1"));
///     assert_eq!(store.count().await, 1);
/// }
/// ```
#[derive(Debug)]
pub struct ContextStore {
    entries: RwLock<IndexMap<String, Entry>>,
    ttl: Duration,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a copy of the session's context, creating a fresh one if unknown.
    pub async fn get(&self, session_id: &str) -> ConversationContext {
        self.update(session_id, |context| context.clone()).await
    }

    /// Store `context` under its own session id, replacing any previous one.
    pub async fn save(&self, context: ConversationContext) {
        let session_id = context.session_id.clone();
        self.update(&session_id, move |slot| *slot = context).await
    }

    /// Run `f` against the session's context under the store's write lock.
    ///
    /// The session is created if it does not exist yet. Concurrent updates to
    /// the same session are serialized, so none of them is lost.
    pub async fn update<F, R>(&self, session_id: &str, f: F) -> R
    where
        F: FnOnce(&mut ConversationContext) -> R,
    {
        let mut entries = self.entries.write().await;

        // The entry stays in the map while `f` runs.
        let (index, entry) = match entries.entry(session_id.to_string()) {
            MapEntry::Occupied(occupied) => (occupied.index(), occupied.into_mut()),
            MapEntry::Vacant(vacant) => {
                debug!("Creating conversation context for session {}", session_id);
                let index = vacant.index();
                let entry = vacant.insert(Entry {
                    context: ConversationContext::new(session_id),
                    last_accessed: Instant::now(),
                });
                (index, entry)
            }
        };
        let result = f(&mut entry.context);
        entry.last_accessed = Instant::now();

        // Move to end to mark as recently used
        let last = entries.len() - 1;
        entries.move_index(index, last);
        result
    }

    /// Append a spoken turn to the session's audit trail.
    pub async fn append_to_conversation_history(&self, session_id: &str, role: &str, message: &str) {
        let timestamp = utc_timestamp();
        self.update(session_id, |context| {
            context.conversation_history.push(HistoryEntry::Message {
                role: role.to_string(),
                message: message.to_string(),
                timestamp,
            });
        })
        .await;
    }

    /// Append a completed tool call to the session's audit trail.
    pub async fn record_tool_call(&self, session_id: &str, name: &str, success: bool) {
        let timestamp = utc_timestamp();
        self.update(session_id, |context| {
            context.conversation_history.push(HistoryEntry::ToolCall {
                name: name.to_string(),
                success,
                timestamp,
            });
        })
        .await;
    }

    /// Record that the caller interrupted, returning the session's running count.
    pub async fn record_interruption(&self, session_id: &str, reason: &str) -> u32 {
        let timestamp = utc_timestamp();
        let count = self
            .update(session_id, |context| {
                let count = context.interruption_count() + 1;
                context.conversation_history.push(HistoryEntry::Interruption {
                    reason: reason.to_string(),
                    count,
                    timestamp: Some(timestamp),
                });
                count
            })
            .await;
        debug!("Interruption {} in session {}: {}", count, session_id, reason);
        count
    }

    /// Remove sessions idle for longer than the TTL. Returns how many went.
    pub async fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now()).await
    }

    /// [`sweep_expired`](Self::sweep_expired) against an explicit clock reading.
    pub async fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().await;

        let expired = entries
            .values()
            .take_while(|entry| now.saturating_duration_since(entry.last_accessed) > self.ttl)
            .count();
        entries.drain(..expired);

        if expired > 0 {
            info!(
                "Swept {} expired sessions ({} remaining)",
                expired,
                entries.len()
            );
        }
        expired
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear_all(&self) {
        self.entries.write().await.clear();
    }
}

fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::ConversationPhase;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_creates_default_context() {
        let store = ContextStore::new();

        let context = store.get("abc").await;
        assert_eq!(context.session_id, "abc");
        assert!(!context.safety_confirmed);
        assert_eq!(context.current_phase, ConversationPhase::SafetyCheck);
        assert!(context.missing_fields.is_empty());
        assert!(context.conversation_history.is_empty());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let store = ContextStore::new();

        let mut context = store.get("abc").await;
        context.damage_description = Some("dented bumper".to_string());
        store.save(context).await;

        let context = store.get("abc").await;
        assert_eq!(context.damage_description.as_deref(), Some("dented bumper"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = ContextStore::new();

        store
            .update("a", |c| c.policy_id = Some("POL-A".to_string()))
            .await;

        assert_eq!(store.get("a").await.policy_id.as_deref(), Some("POL-A"));
        assert_eq!(store.get("b").await.policy_id, None);
    }

    #[tokio::test]
    async fn test_history_and_interruptions() {
        let store = ContextStore::new();

        store
            .append_to_conversation_history("s", "user", "I was rear-ended")
            .await;
        assert_eq!(store.record_interruption("s", "barge-in").await, 1);
        assert_eq!(store.record_interruption("s", "barge-in").await, 2);

        let context = store.get("s").await;
        assert_eq!(context.conversation_history.len(), 3);
        match &context.conversation_history[0] {
            HistoryEntry::Message {
                role,
                message,
                timestamp,
            } => {
                assert_eq!(role, "user");
                assert_eq!(message, "I was rear-ended");
                assert!(timestamp.ends_with('Z'));
            }
            other => panic!("unexpected entry: {:?}", other),
        }
        assert_eq!(context.interruption_count(), 2);

        store.record_tool_call("s", "assess_safety", true).await;
        let context = store.get("s").await;
        assert!(matches!(
            context.conversation_history.last(),
            Some(HistoryEntry::ToolCall { name, success: true, .. }) if name == "assess_safety"
        ));
        assert_eq!(context.interruption_count(), 2);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_idle_sessions() {
        let store = ContextStore::with_ttl(Duration::from_secs(60));

        store.get("old").await;
        store.get("fresh").await;
        let later = Instant::now() + Duration::from_secs(61);

        // Touch "old" again so it is no longer first in line.
        store.get("old").await;
        assert_eq!(store.sweep_expired_at(Instant::now()).await, 0);

        assert_eq!(store.sweep_expired_at(later).await, 2);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_sweep_stops_at_first_live_session() {
        let store = ContextStore::with_ttl(Duration::from_millis(50));

        store.get("stale").await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        store.get("live").await;

        assert_eq!(store.sweep_expired().await, 1);
        assert_eq!(store.count().await, 1);

        // A swept session comes back fresh.
        let context = store.get("stale").await;
        assert!(context.conversation_history.is_empty());
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(ContextStore::new());

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append_to_conversation_history("shared", "user", &format!("turn {}", i))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get("shared").await.conversation_history.len(), 20);
    }

    #[tokio::test]
    async fn test_panicking_update_keeps_session() {
        let store = Arc::new(ContextStore::new());
        store
            .update("s", |context| context.policy_id = Some("POL-1".to_string()))
            .await;
        store.get("other").await;

        let task_store = store.clone();
        let result = tokio::spawn(async move {
            task_store
                .update("s", |_| -> () { panic!("update failed") })
                .await
        })
        .await;
        assert!(result.unwrap_err().is_panic());

        assert_eq!(store.count().await, 2);
        assert_eq!(store.get("s").await.policy_id.as_deref(), Some("POL-1"));
    }

    #[tokio::test]
    async fn test_update_moves_session_to_back() {
        let store = ContextStore::with_ttl(Duration::from_millis(50));
        store.get("first").await;
        store.get("second").await;
        tokio::time::sleep(Duration::from_millis(120)).await;

        store.get("first").await;
        assert_eq!(store.sweep_expired().await, 1);
        assert_eq!(store.count().await, 1);
        assert!(store.entries.read().await.contains_key("first"));
    }

    #[tokio::test]
    async fn test_save_replaces_in_place_and_refreshes() {
        let store = ContextStore::with_ttl(Duration::from_millis(50));
        store.get("first").await;
        store.get("second").await;
        tokio::time::sleep(Duration::from_millis(120)).await;

        let mut context = ConversationContext::new("first");
        context.policy_id = Some("POL-2".to_string());
        store.save(context).await;

        assert_eq!(store.count().await, 2);
        assert_eq!(store.sweep_expired().await, 1);
        assert_eq!(store.get("first").await.policy_id.as_deref(), Some("POL-2"));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = ContextStore::new();
        store.get("a").await;
        store.get("b").await;

        store.clear_all().await;
        assert_eq!(store.count().await, 0);
    }
}
