use serde::{Deserialize, Serialize};
use store::{Document, Message, Role, Session, SessionMode};
use uuid::Uuid;

use crate::errors::ApiError;

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::ValidationError(format!("Missing {}", field)))
}

/// Ids are opaque to clients; one that is not a UUID cannot name a stored record.
pub fn lookup_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::NotFound(format!("{} {} not found", entity, raw.trim())))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub query: Option<String>,
    #[serde(alias = "pdf_id")]
    pub document_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrieveQuery {
    pub query: String,
    /// `None` when the requested id cannot belong to any document.
    pub document_id: Option<Uuid>,
    pub limit: Option<usize>,
}

impl RetrieveRequest {
    pub fn validate(self) -> Result<RetrieveQuery, ApiError> {
        let query = required(self.query, "query")?;
        let document_id = Uuid::parse_str(required(self.document_id, "document_id")?.trim()).ok();
        Ok(RetrieveQuery {
            query,
            document_id,
            limit: self.limit,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub chunks: Vec<String>,
    /// The chunks rendered as a numbered prompt context.
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub document_id: Uuid,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: Option<String>,
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let query = required(self.query, "query")?;
        let session_id = required(self.session_id, "session_id")?.trim().to_string();
        Ok((query, session_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub message_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub name: Option<String>,
    pub mode: Option<String>,
    #[serde(alias = "pdf_id")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub name: String,
    pub mode: SessionMode,
    pub document_id: Option<Uuid>,
}

impl CreateSessionRequest {
    pub fn validate(self) -> Result<NewSession, ApiError> {
        let name = required(self.name, "name")?.trim().to_string();
        let mode = required(self.mode, "mode")?
            .parse::<SessionMode>()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;
        let document_id = match self.document_id.filter(|id| !id.trim().is_empty()) {
            Some(raw) => Some(lookup_id(&raw, "document")?),
            None => None,
        };
        Ok(NewSession {
            name,
            mode,
            document_id,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppendMessageRequest {
    pub session_id: Option<String>,
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub session_id: Uuid,
    pub role: Role,
    pub content: String,
}

impl AppendMessageRequest {
    pub fn validate(self) -> Result<NewMessage, ApiError> {
        let session_id = lookup_id(&required(self.session_id, "session_id")?, "session")?;
        let role = required(self.role, "role")?
            .parse::<Role>()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;
        let content = required(self.content, "content")?;
        Ok(NewMessage {
            session_id,
            role,
            content,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsResponse {
    pub documents: Vec<Document>,
}
