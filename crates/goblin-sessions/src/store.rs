use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::types::Session;

/// Shared handle to one user's session.
///
/// The mutex is held for the whole orchestrated turn, so overlapping
/// requests from the same user queue instead of interleaving their
/// identifier updates.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Process-wide store of per-user conversation sessions.
///
/// Sessions are created lazily and never evicted; unbounded growth over the
/// process lifetime is an accepted tradeoff. `reset` clears a session in
/// place, so handles obtained earlier observe the cleared state.
pub struct SessionStore {
    sessions: DashMap<String, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Return the handle for `user_id`, creating a fresh session if absent.
    pub fn get(&self, user_id: &str) -> SessionHandle {
        self.sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(user_id))))
            .value()
            .clone()
    }

    /// Clear the conversation identifiers for `user_id`, creating the
    /// session if it does not exist yet. Waits for any in-flight turn, which
    /// holds the session lock, to finish first.
    pub async fn reset(&self, user_id: &str) {
        let handle = self.get(user_id);
        handle.lock().await.clear();
    }

    /// Number of sessions currently held.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_creates_once_and_returns_same_handle() {
        let store = SessionStore::new();
        let a = store.get("u1");
        let b = store.get("u1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);

        let s = a.lock().await;
        assert!(s.is_new);
        assert!(s.conversation_id.is_none());
    }

    #[tokio::test]
    async fn distinct_users_get_distinct_sessions() {
        let store = SessionStore::new();
        let a = store.get("u1");
        let b = store.get("u2");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn reset_clears_identifiers_in_place() {
        let store = SessionStore::new();
        let handle = store.get("u1");
        handle
            .lock()
            .await
            .record_exchange("conv-1".to_string(), "msg-9".to_string());

        store.reset("u1").await;

        // A handle obtained before the reset observes the cleared state.
        let s = handle.lock().await;
        assert!(s.is_new);
        assert!(s.conversation_id.is_none());
        assert!(s.parent_message_id.is_none());
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let store = SessionStore::new();
        store
            .get("u1")
            .lock()
            .await
            .record_exchange("conv-1".to_string(), "msg-1".to_string());

        store.reset("u1").await;
        let once = store.get("u1").lock().await.clone();
        store.reset("u1").await;
        let twice = store.get("u1").lock().await.clone();

        assert_eq!(once, twice);
        assert!(twice.is_new);
    }

    #[tokio::test]
    async fn reset_creates_missing_session() {
        let store = SessionStore::new();
        store.reset("ghost").await;
        assert_eq!(store.len(), 1);
        assert!(store.get("ghost").lock().await.is_new);
    }
}
