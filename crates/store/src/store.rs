use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::memory::InMemoryStore;
use crate::models::{Chunk, Document, Message, Session};
use crate::postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for documents, their chunks, sessions and messages.
///
/// Parent deletion always removes dependent records: deleting a document drops
/// its chunks and detaches sessions pointing at it, deleting a session drops
/// its messages. Each call is atomic.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Stores a document together with its whole chunk batch, or nothing at all.
    async fn insert_document(&self, document: &Document, chunks: &[Chunk]) -> StoreResult<()>;

    async fn get_document(&self, id: Uuid) -> StoreResult<Document>;

    /// Newest first.
    async fn list_documents(&self) -> StoreResult<Vec<Document>>;

    async fn delete_document(&self, id: Uuid) -> StoreResult<()>;

    /// Chunks ordered by ordinal. Unknown documents yield an empty list.
    async fn list_chunks(&self, document_id: Uuid) -> StoreResult<Vec<Chunk>>;

    async fn create_session(&self, session: &Session) -> StoreResult<()>;

    async fn get_session(&self, id: Uuid) -> StoreResult<Session>;

    /// Most recently updated first.
    async fn list_sessions(&self) -> StoreResult<Vec<Session>>;

    async fn delete_session(&self, id: Uuid) -> StoreResult<()>;

    /// Oldest first; messages sharing a timestamp keep insertion order.
    async fn list_messages(&self, session_id: Uuid) -> StoreResult<Vec<Message>>;

    /// Inserts the message and moves the session's `updated_at` to its timestamp.
    async fn append_message(&self, message: &Message) -> StoreResult<()>;
}

/// Picks a store implementation from the URL scheme.
pub async fn connect(database_url: &str) -> StoreResult<Arc<dyn ChatStore>> {
    if database_url.starts_with("memory://") {
        info!("Using in-memory store");
        Ok(Arc::new(InMemoryStore::new()))
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
    {
        let store = PgStore::connect(database_url).await?;
        Ok(Arc::new(store))
    } else {
        Err(StoreError::UnsupportedUrl(database_url.to_string()))
    }
}
