use chat_core::Config;
use ingest::DocumentIngestor;
use retrieval::{format_context, Retriever};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use store::{ChatStore, Chunk, Document, Message, Session};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{
    ChatResponse, NewMessage, NewSession, RetrieveQuery, RetrieveResponse, UploadResponse,
};

async fn remove_upload(path: &Path, document_id: Uuid) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(%document_id, error = %e, "Failed to remove saved upload"),
    }
}

/// Orchestrates ingestion, retrieval and the session/message CRUD on top of one store.
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    ingestor: Arc<DocumentIngestor>,
    retriever: Retriever,
    upload_dir: Option<PathBuf>,
    no_match_placeholder: String,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("store", &"ChatStore<...>")
            .field("ingestor", &self.ingestor)
            .field("retriever", &self.retriever)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

impl ChatService {
    pub fn new(config: &Config, store: Arc<dyn ChatStore>) -> Self {
        Self::with_ingestor(config, store, DocumentIngestor::new(config.ingest.clone()))
    }

    /// Builds the service around a preconfigured ingestor.
    pub fn with_ingestor(
        config: &Config,
        store: Arc<dyn ChatStore>,
        ingestor: DocumentIngestor,
    ) -> Self {
        Self {
            store,
            ingestor: Arc::new(ingestor),
            retriever: Retriever::new(&config.retrieval),
            upload_dir: config.storage.upload_dir.clone(),
            no_match_placeholder: config.retrieval.no_match_placeholder.clone(),
        }
    }

    fn upload_path(&self, document_id: Uuid) -> Option<PathBuf> {
        self.upload_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.pdf", document_id)))
    }

    /// Chunks an uploaded file and stores the document with all of its chunks.
    /// Nothing is stored when the file is rejected or yields no text.
    pub async fn ingest_upload(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let ingestor = Arc::clone(&self.ingestor);
        // PDF parsing is CPU bound.
        let (ingested, bytes) = tokio::task::spawn_blocking(move || {
            ingestor
                .ingest(&file_name, &bytes)
                .map(|ingested| (ingested, bytes))
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("Ingestion task failed: {}", e)))??;

        let document = Document::new(ingested.name.clone(), ingested.chunks.len());
        let chunks = Chunk::sequence(document.id, ingested.chunk_contents());
        self.store.insert_document(&document, &chunks).await?;

        if let Some(path) = self.upload_path(document.id) {
            if let Err(e) = self.save_upload(&path, &bytes).await {
                warn!(document_id = %document.id, error = %e, "Failed to save upload, rolling back");
                remove_upload(&path, document.id).await;
                self.store.delete_document(document.id).await?;
                return Err(ApiError::StorageError(format!("Failed to save upload: {}", e)));
            }
        }

        info!(
            document_id = %document.id,
            name = %document.name,
            pages = ingested.page_count,
            chunk_count = document.chunk_count,
            "Document ingested"
        );

        Ok(UploadResponse {
            document_id: document.id,
            chunk_count: document.chunk_count,
        })
    }

    async fn save_upload(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await
    }

    /// Retrieves the best chunks for a query. When nothing matches, the single
    /// configured placeholder is returned in their place.
    pub async fn retrieve(&self, request: RetrieveQuery) -> Result<RetrieveResponse, ApiError> {
        let mut chunks = match request.document_id {
            Some(document_id) => {
                self.retriever
                    .retrieve(
                        self.store.as_ref(),
                        &request.query,
                        document_id,
                        request.limit,
                    )
                    .await?
            }
            None => Vec::new(),
        };

        if chunks.is_empty() {
            chunks = vec![self.no_match_placeholder.clone()];
        }

        let context = format_context(&chunks);
        Ok(RetrieveResponse { chunks, context })
    }

    /// The model runs client-side; the backend only acknowledges the turn.
    pub async fn chat(&self, query: &str, session_id: &str) -> Result<ChatResponse, ApiError> {
        let message_id = Uuid::new_v4();
        tracing::debug!(session_id, %message_id, query_len = query.len(), "Chat acknowledged");
        Ok(ChatResponse {
            response: "Acknowledged".to_string(),
            message_id,
        })
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        Ok(self.store.list_documents().await?)
    }

    pub async fn get_document(&self, id: Uuid) -> Result<Document, ApiError> {
        Ok(self.store.get_document(id).await?)
    }

    /// Deletes a document, its chunks and its saved upload.
    pub async fn delete_document(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.delete_document(id).await?;

        if let Some(path) = self.upload_path(id) {
            remove_upload(&path, id).await;
        }

        info!(document_id = %id, "Document deleted");
        Ok(())
    }

    pub async fn create_session(&self, new_session: NewSession) -> Result<Session, ApiError> {
        let session = Session::new(new_session.name, new_session.mode, new_session.document_id);
        self.store.create_session(&session).await?;
        info!(session_id = %session.id, mode = %session.mode, "Session created");
        Ok(session)
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        Ok(self.store.list_sessions().await?)
    }

    pub async fn get_session(&self, id: Uuid) -> Result<Session, ApiError> {
        Ok(self.store.get_session(id).await?)
    }

    pub async fn delete_session(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.delete_session(id).await?;
        info!(session_id = %id, "Session deleted");
        Ok(())
    }

    pub async fn list_messages(&self, session_id: Uuid) -> Result<Vec<Message>, ApiError> {
        Ok(self.store.list_messages(session_id).await?)
    }

    pub async fn append_message(&self, new_message: NewMessage) -> Result<Message, ApiError> {
        let message = Message::new(new_message.session_id, new_message.role, new_message.content);
        self.store.append_message(&message).await?;
        Ok(message)
    }
}
