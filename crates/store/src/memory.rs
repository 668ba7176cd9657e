use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{validate_chunk_batch, Chunk, Document, Message, Session};
use crate::store::{ChatStore, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    documents: HashMap<Uuid, Document>,
    chunks: HashMap<Uuid, Vec<Chunk>>,
    sessions: HashMap<Uuid, Session>,
    // Kept in insertion order per session.
    messages: HashMap<Uuid, Vec<Message>>,
}

/// Process-local store for development and tests. Every operation holds one
/// lock for its whole duration, which makes cascades atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for InMemoryStore {
    async fn insert_document(&self, document: &Document, chunks: &[Chunk]) -> StoreResult<()> {
        validate_chunk_batch(document, chunks)?;

        let mut tables = self.tables.lock().await;
        if tables.documents.contains_key(&document.id) {
            return Err(StoreError::InvalidRecord(format!(
                "document {} already exists",
                document.id
            )));
        }
        tables.documents.insert(document.id, document.clone());
        tables.chunks.insert(document.id, chunks.to_vec());
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> StoreResult<Document> {
        let tables = self.tables.lock().await;
        tables
            .documents
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("document", id))
    }

    async fn list_documents(&self) -> StoreResult<Vec<Document>> {
        let tables = self.tables.lock().await;
        let mut documents: Vec<Document> = tables.documents.values().cloned().collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(documents)
    }

    async fn delete_document(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.documents.remove(&id).is_none() {
            return Err(StoreError::not_found("document", id));
        }
        tables.chunks.remove(&id);
        for session in tables.sessions.values_mut() {
            if session.document_id == Some(id) {
                session.document_id = None;
            }
        }
        Ok(())
    }

    async fn list_chunks(&self, document_id: Uuid) -> StoreResult<Vec<Chunk>> {
        let tables = self.tables.lock().await;
        Ok(tables.chunks.get(&document_id).cloned().unwrap_or_default())
    }

    async fn create_session(&self, session: &Session) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(document_id) = session.document_id {
            if !tables.documents.contains_key(&document_id) {
                return Err(StoreError::not_found("document", document_id));
            }
        }
        if tables.sessions.contains_key(&session.id) {
            return Err(StoreError::InvalidRecord(format!(
                "session {} already exists",
                session.id
            )));
        }
        tables.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> StoreResult<Session> {
        let tables = self.tables.lock().await;
        tables
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("session", id))
    }

    async fn list_sessions(&self) -> StoreResult<Vec<Session>> {
        let tables = self.tables.lock().await;
        let mut sessions: Vec<Session> = tables.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(sessions)
    }

    async fn delete_session(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.sessions.remove(&id).is_none() {
            return Err(StoreError::not_found("session", id));
        }
        tables.messages.remove(&id);
        Ok(())
    }

    async fn list_messages(&self, session_id: Uuid) -> StoreResult<Vec<Message>> {
        let tables = self.tables.lock().await;
        if !tables.sessions.contains_key(&session_id) {
            return Err(StoreError::not_found("session", session_id));
        }
        let mut messages = tables
            .messages
            .get(&session_id)
            .cloned()
            .unwrap_or_default();
        // Stable, so equal timestamps stay in insertion order.
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn append_message(&self, message: &Message) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        let session = tables
            .sessions
            .get_mut(&message.session_id)
            .ok_or_else(|| StoreError::not_found("session", message.session_id))?;
        session.updated_at = message.timestamp;
        tables
            .messages
            .entry(message.session_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, SessionMode};

    async fn store_with_document(contents: &[&str]) -> (InMemoryStore, Document) {
        let store = InMemoryStore::new();
        let document = Document::new("guide.pdf".to_string(), contents.len());
        let chunks = Chunk::sequence(document.id, contents.iter().map(|c| c.to_string()));
        store.insert_document(&document, &chunks).await.unwrap();
        (store, document)
    }

    #[tokio::test]
    async fn should_store_chunks_with_contiguous_ordinals() {
        let (store, document) = store_with_document(&["one", "two", "three"]).await;

        let chunks = store.list_chunks(document.id).await.unwrap();

        assert_eq!(chunks.len(), document.chunk_count);
        assert_eq!(
            chunks.iter().map(|c| c.ordinal).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(chunks[2].content, "three");
    }

    #[tokio::test]
    async fn should_reject_invalid_batch_without_partial_state() {
        let store = InMemoryStore::new();
        let document = Document::new("bad.pdf".to_string(), 2);
        let chunks = vec![
            Chunk::new(document.id, 0, "fine".to_string()),
            Chunk::new(document.id, 2, "gap".to_string()),
        ];

        assert!(store.insert_document(&document, &chunks).await.is_err());
        assert!(store.get_document(document.id).await.unwrap_err().is_not_found());
        assert!(store.list_chunks(document.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_empty_chunks_for_unknown_document() {
        let store = InMemoryStore::new();
        assert!(store.list_chunks(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_cascade_document_deletion_to_chunks() {
        let (store, document) = store_with_document(&["one", "two"]).await;

        store.delete_document(document.id).await.unwrap();

        assert!(store.list_chunks(document.id).await.unwrap().is_empty());
        assert!(store.get_document(document.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn should_detach_sessions_from_deleted_document() {
        let (store, document) = store_with_document(&["one"]).await;
        let session = Session::new("guide".to_string(), SessionMode::Pdf, Some(document.id));
        store.create_session(&session).await.unwrap();

        store.delete_document(document.id).await.unwrap();

        let session = store.get_session(session.id).await.unwrap();
        assert_eq!(session.document_id, None);
    }

    #[tokio::test]
    async fn should_report_missing_document_on_delete() {
        let store = InMemoryStore::new();
        let error = store.delete_document(Uuid::new_v4()).await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn should_list_documents_newest_first() {
        let store = InMemoryStore::new();
        let mut older = Document::new("older.pdf".to_string(), 1);
        older.created_at = older.created_at - chrono::Duration::seconds(10);
        let newer = Document::new("newer.pdf".to_string(), 1);

        for document in [&older, &newer] {
            let chunks = Chunk::sequence(document.id, vec!["text".to_string()]);
            store.insert_document(document, &chunks).await.unwrap();
        }

        let names: Vec<String> = store
            .list_documents()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["newer.pdf", "older.pdf"]);
    }

    #[tokio::test]
    async fn should_reject_session_for_unknown_document() {
        let store = InMemoryStore::new();
        let session = Session::new("x".to_string(), SessionMode::Pdf, Some(Uuid::new_v4()));

        let error = store.create_session(&session).await.unwrap_err();
        assert!(error.is_not_found());
        assert!(store.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_update_session_timestamp_on_append() {
        let store = InMemoryStore::new();
        let session = Session::new("chat".to_string(), SessionMode::Chat, None);
        store.create_session(&session).await.unwrap();

        let mut message = Message::new(session.id, Role::User, "hello".to_string());
        message.timestamp = session.updated_at + chrono::Duration::seconds(5);
        store.append_message(&message).await.unwrap();

        let stored = store.get_session(session.id).await.unwrap();
        assert_eq!(stored.updated_at, message.timestamp);
        assert_eq!(stored.created_at, session.created_at);
    }

    #[tokio::test]
    async fn should_list_messages_in_insertion_order() {
        let store = InMemoryStore::new();
        let session = Session::new("chat".to_string(), SessionMode::Chat, None);
        store.create_session(&session).await.unwrap();

        let contents = ["first", "second", "third", "fourth"];
        for (i, content) in contents.iter().enumerate() {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            let message = Message::new(session.id, role, content.to_string());
            store.append_message(&message).await.unwrap();
        }

        let listed: Vec<String> = store
            .list_messages(session.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(listed, contents);
    }

    #[tokio::test]
    async fn should_keep_insertion_order_for_equal_timestamps() {
        let store = InMemoryStore::new();
        let session = Session::new("chat".to_string(), SessionMode::Chat, None);
        store.create_session(&session).await.unwrap();

        let timestamp = crate::models::now();
        for content in ["a", "b", "c"] {
            let mut message = Message::new(session.id, Role::User, content.to_string());
            message.timestamp = timestamp;
            store.append_message(&message).await.unwrap();
        }

        let listed: Vec<String> = store
            .list_messages(session.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(listed, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn should_reject_message_for_unknown_session() {
        let store = InMemoryStore::new();
        let message = Message::new(Uuid::new_v4(), Role::User, "hello".to_string());

        assert!(store.append_message(&message).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn should_cascade_session_deletion_to_messages() {
        let store = InMemoryStore::new();
        let session = Session::new("chat".to_string(), SessionMode::Chat, None);
        store.create_session(&session).await.unwrap();
        for content in ["one", "two", "three"] {
            let message = Message::new(session.id, Role::User, content.to_string());
            store.append_message(&message).await.unwrap();
        }

        store.delete_session(session.id).await.unwrap();

        assert!(store.list_messages(session.id).await.unwrap_err().is_not_found());
        assert!(store.delete_session(session.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn should_list_sessions_by_most_recent_activity() {
        let store = InMemoryStore::new();
        let first = Session::new("first".to_string(), SessionMode::Chat, None);
        let second = Session::new("second".to_string(), SessionMode::Chat, None);
        store.create_session(&first).await.unwrap();
        store.create_session(&second).await.unwrap();

        let mut message = Message::new(first.id, Role::User, "bump".to_string());
        message.timestamp = second.updated_at + chrono::Duration::seconds(1);
        store.append_message(&message).await.unwrap();

        let names: Vec<String> = store
            .list_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
