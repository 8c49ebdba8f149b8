// src/core/session.rs — Per-chat document sessions
//
// One session per chat. Uploading replaces, deleting removes. Readers get an
// `Arc<Session>` snapshot, so a replacement never disturbs an answer that is
// already running against the old document.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, MutexGuard, TryLockError};

use super::answer::{BoundPrompt, PromptTemplate};
use super::types::ChatId;

#[derive(Debug)]
pub struct Session {
    chat_id: ChatId,
    file_name: String,
    document_text: Arc<str>,
    prompt: BoundPrompt,
    created_at: DateTime<Utc>,
    /// Serialises questions within this session. Fair (FIFO).
    lock: Mutex<()>,
}

impl Session {
    pub fn new(
        chat_id: ChatId,
        file_name: impl Into<String>,
        document_text: impl Into<String>,
        template: &Arc<PromptTemplate>,
    ) -> Self {
        let document_text: Arc<str> = Arc::from(document_text.into());
        let prompt = template.bind(Arc::clone(&document_text));
        Self {
            chat_id,
            file_name: file_name.into(),
            document_text,
            prompt,
            created_at: Utc::now(),
            lock: Mutex::new(()),
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn document_text(&self) -> &str {
        &self.document_text
    }

    pub fn prompt(&self) -> &BoundPrompt {
        &self.prompt
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Waits for any in-flight question in this session to finish.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub fn try_lock(&self) -> Result<MutexGuard<'_, ()>, TryLockError> {
        self.lock.try_lock()
    }
}

/// Concurrent map from chat to its current session.
///
/// The inner lock is only held for map operations, never across an await.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ChatId, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session` for its chat, returning the one it replaced.
    pub fn put(&self, session: Session) -> Option<Arc<Session>> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(session.chat_id(), Arc::new(session))
    }

    pub fn get(&self, chat_id: ChatId) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(&chat_id).cloned()
    }

    /// Remove the chat's session. Returns whether one existed.
    pub fn delete(&self, chat_id: ChatId) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(&chat_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::answer::DEFAULT_TEMPLATE;

    fn template() -> Arc<PromptTemplate> {
        Arc::new(PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap())
    }

    #[test]
    fn test_put_get_delete() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        assert!(store.put(Session::new(ChatId(1), "a.txt", "one", &template())).is_none());
        let session = store.get(ChatId(1)).unwrap();
        assert_eq!(session.document_text(), "one");
        assert_eq!(session.file_name(), "a.txt");
        assert!(store.get(ChatId(2)).is_none());

        assert!(store.delete(ChatId(1)));
        assert!(!store.delete(ChatId(1)));
        assert!(store.get(ChatId(1)).is_none());
    }

    #[test]
    fn test_replace_keeps_old_snapshot_alive() {
        let store = SessionStore::new();
        store.put(Session::new(ChatId(1), "a.txt", "old", &template()));
        let old = store.get(ChatId(1)).unwrap();

        let replaced = store.put(Session::new(ChatId(1), "b.txt", "new", &template()));
        assert_eq!(replaced.unwrap().document_text(), "old");
        assert_eq!(old.document_text(), "old");
        assert_eq!(store.get(ChatId(1)).unwrap().document_text(), "new");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_chats_are_isolated() {
        let store = SessionStore::new();
        store.put(Session::new(ChatId(1), "a.txt", "A", &template()));
        store.put(Session::new(ChatId(2), "b.txt", "B", &template()));

        store.delete(ChatId(1));
        assert_eq!(store.get(ChatId(2)).unwrap().document_text(), "B");
    }

    #[test]
    fn test_document_text_shared_with_prompt() {
        let session = Session::new(ChatId(1), "a.txt", "shared body", &template());
        // One copy owned by the session, one held by the bound prompt.
        assert_eq!(Arc::strong_count(&session.document_text), 2);
        assert!(session.prompt().render("q").unwrap().contains("shared body"));
    }

    #[tokio::test]
    async fn test_session_lock_is_exclusive() {
        let session = Session::new(ChatId(1), "a.txt", "doc", &template());
        let guard = session.lock().await;
        assert!(session.try_lock().is_err());
        drop(guard);
        assert!(session.try_lock().is_ok());
    }
}
