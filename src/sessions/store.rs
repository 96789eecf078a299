use super::types::{ChatId, Session};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

/// Keyed access to per-chat sessions.
///
/// Handing out a per-chat async mutex lets a handler hold its chat's session
/// across awaits while other chats proceed.
pub trait SessionStore: Send + Sync {
    /// The chat's session, created at position 0 with no language if new.
    fn session(&self, chat: ChatId) -> SharedSession;

    /// Forget a chat entirely. Returns whether it existed.
    fn remove(&self, chat: ChatId) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<ChatId, SharedSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of a chat's session, without creating one.
    pub async fn snapshot(&self, chat: ChatId) -> Option<Session> {
        let shared = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chat)
            .cloned()?;
        let session = shared.lock().await;
        Some(session.clone())
    }
}

impl SessionStore for InMemorySessionStore {
    fn session(&self, chat: ChatId) -> SharedSession {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(sessions.entry(chat).or_default())
    }

    fn remove(&self, chat: ChatId) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&chat)
            .is_some()
    }

    fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn session_is_created_once_and_shared() {
        let store = InMemorySessionStore::new();
        assert!(store.is_empty());

        let first = store.session(ChatId(1));
        first.lock().await.position = 3;

        let again = store.session(ChatId(1));
        assert_eq!(again.lock().await.position, 3);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn new_sessions_start_at_zero_without_language() {
        let store = InMemorySessionStore::new();
        let session = store.session(ChatId(42));
        let session = session.lock().await;
        assert_eq!(session.position, 0);
        assert_eq!(session.language, "");
        assert!(session.last_responses.is_empty());
    }

    #[tokio::test]
    async fn snapshot_does_not_create() {
        let store = InMemorySessionStore::new();
        assert!(store.snapshot(ChatId(7)).await.is_none());
        assert!(store.is_empty());

        store.session(ChatId(7)).lock().await.language = "ru".into();
        assert_eq!(store.snapshot(ChatId(7)).await.unwrap().language, "ru");
    }

    #[tokio::test]
    async fn remove_forgets_chat() {
        let store = InMemorySessionStore::new();
        store.session(ChatId(1)).lock().await.position = 5;
        assert!(store.remove(ChatId(1)));
        assert!(!store.remove(ChatId(1)));
        assert_eq!(store.session(ChatId(1)).lock().await.position, 0);
    }

    #[tokio::test]
    async fn different_chats_do_not_block_each_other() {
        let store = InMemorySessionStore::new();
        let held = store.session(ChatId(1));
        let _guard = held.lock().await;

        let other = store.session(ChatId(2));
        let locked = tokio::time::timeout(Duration::from_millis(100), other.lock()).await;
        assert!(locked.is_ok());
    }
}
