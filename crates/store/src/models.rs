use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StoreError;

/// Current UTC time at microsecond precision, the resolution Postgres keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Chat,
    Pdf,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Chat => "chat",
            SessionMode::Pdf => "pdf",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(SessionMode::Chat),
            "pdf" => Ok(SessionMode::Pdf),
            other => Err(StoreError::InvalidRecord(format!(
                "unknown session mode '{}', expected 'chat' or 'pdf'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(StoreError::InvalidRecord(format!(
                "unknown role '{}', expected 'user' or 'assistant'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: String, chunk_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            chunk_count,
            created_at: now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub document_id: Uuid,
    pub ordinal: usize,
    pub content: String,
}

impl Chunk {
    pub fn new(document_id: Uuid, ordinal: usize, content: String) -> Self {
        Self {
            document_id,
            ordinal,
            content,
        }
    }

    /// Numbers `contents` from zero in the order given.
    pub fn sequence<I>(document_id: Uuid, contents: I) -> Vec<Chunk>
    where
        I: IntoIterator<Item = String>,
    {
        contents
            .into_iter()
            .enumerate()
            .map(|(ordinal, content)| Chunk::new(document_id, ordinal, content))
            .collect()
    }
}

/// Checks that a chunk batch belongs to `document`, matches its chunk count,
/// is numbered `0..count` and carries no empty content.
pub fn validate_chunk_batch(document: &Document, chunks: &[Chunk]) -> Result<(), StoreError> {
    if chunks.is_empty() {
        return Err(StoreError::InvalidRecord(
            "a document needs at least one chunk".to_string(),
        ));
    }
    if chunks.len() != document.chunk_count {
        return Err(StoreError::InvalidRecord(format!(
            "document declares {} chunks but {} were given",
            document.chunk_count,
            chunks.len()
        )));
    }
    for (expected, chunk) in chunks.iter().enumerate() {
        if chunk.document_id != document.id {
            return Err(StoreError::InvalidRecord(format!(
                "chunk {} belongs to another document",
                chunk.ordinal
            )));
        }
        if chunk.ordinal != expected {
            return Err(StoreError::InvalidRecord(format!(
                "chunk ordinal {} found where {} was expected",
                chunk.ordinal, expected
            )));
        }
        if chunk.content.trim().is_empty() {
            return Err(StoreError::InvalidRecord(format!(
                "chunk {} is empty",
                chunk.ordinal
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub mode: SessionMode,
    pub document_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(name: String, mode: SessionMode, document_id: Option<Uuid>) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            name,
            mode,
            document_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(session_id: Uuid, role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role,
            content,
            timestamp: now(),
        }
    }
}
