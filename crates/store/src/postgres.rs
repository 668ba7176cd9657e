use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{validate_chunk_batch, Chunk, Document, Message, Session};
use crate::store::{ChatStore, StoreResult};

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects to Postgres and applies pending migrations.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        db_migrations::run_migrations(database_url)
            .await
            .map_err(|e| StoreError::Migration(format!("{:#}", e)))?;

        info!("Postgres store initialized with migrations applied");

        Ok(Self { pool })
    }
}

fn to_count(value: i32, column: &str) -> StoreResult<usize> {
    usize::try_from(value)
        .map_err(|_| StoreError::InvalidRecord(format!("negative {}: {}", column, value)))
}

fn to_db_int(value: usize, column: &str) -> StoreResult<i32> {
    i32::try_from(value)
        .map_err(|_| StoreError::InvalidRecord(format!("{} too large: {}", column, value)))
}

fn document_from_row(row: &PgRow) -> StoreResult<Document> {
    Ok(Document {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        chunk_count: to_count(row.try_get("chunk_count")?, "chunk_count")?,
        created_at: row.try_get("created_at")?,
    })
}

fn chunk_from_row(row: &PgRow) -> StoreResult<Chunk> {
    Ok(Chunk {
        document_id: row.try_get("document_id")?,
        ordinal: to_count(row.try_get("ordinal")?, "ordinal")?,
        content: row.try_get("content")?,
    })
}

fn session_from_row(row: &PgRow) -> StoreResult<Session> {
    let mode: String = row.try_get("mode")?;
    Ok(Session {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        mode: mode.parse()?,
        document_id: row.try_get("document_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn message_from_row(row: &PgRow) -> StoreResult<Message> {
    let role: String = row.try_get("role")?;
    Ok(Message {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        role: role.parse()?,
        content: row.try_get("content")?,
        timestamp: row.try_get("timestamp")?,
    })
}

#[async_trait]
impl ChatStore for PgStore {
    async fn insert_document(&self, document: &Document, chunks: &[Chunk]) -> StoreResult<()> {
        validate_chunk_batch(document, chunks)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, name, chunk_count, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(document.id)
        .bind(&document.name)
        .bind(to_db_int(document.chunk_count, "chunk_count")?)
        .bind(document.created_at)
        .execute(&mut *tx)
        .await?;

        for chunk in chunks {
            sqlx::query(
                r#"
                INSERT INTO document_chunks (document_id, ordinal, content)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(chunk.document_id)
            .bind(to_db_int(chunk.ordinal, "ordinal")?)
            .bind(&chunk.content)
            .execute(&mut *tx)
            .await?;
        }

        // Dropping `tx` on any early return above rolls the whole batch back.
        tx.commit().await?;

        debug!(document_id = %document.id, chunk_count = chunks.len(), "Document stored");
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> StoreResult<Document> {
        let row = sqlx::query("SELECT id, name, chunk_count, created_at FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("document", id))?;

        document_from_row(&row)
    }

    async fn list_documents(&self) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, name, chunk_count, created_at FROM documents ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    async fn delete_document(&self, id: Uuid) -> StoreResult<()> {
        // Chunks cascade and sessions are detached by the foreign keys.
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("document", id));
        }
        Ok(())
    }

    async fn list_chunks(&self, document_id: Uuid) -> StoreResult<Vec<Chunk>> {
        let rows = sqlx::query(
            r#"
            SELECT document_id, ordinal, content
            FROM document_chunks
            WHERE document_id = $1
            ORDER BY ordinal
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(chunk_from_row).collect()
    }

    async fn create_session(&self, session: &Session) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(document_id) = session.document_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM documents WHERE id = $1)")
                    .bind(document_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(StoreError::not_found("document", document_id));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO sessions (id, name, mode, document_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(&session.name)
        .bind(session.mode.as_str())
        .bind(session.document_id)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> StoreResult<Session> {
        let row = sqlx::query(
            r#"
            SELECT id, name, mode, document_id, created_at, updated_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("session", id))?;

        session_from_row(&row)
    }

    async fn list_sessions(&self) -> StoreResult<Vec<Session>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, mode, document_id, created_at, updated_at
            FROM sessions
            ORDER BY updated_at DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }

    async fn delete_session(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("session", id));
        }
        Ok(())
    }

    async fn list_messages(&self, session_id: Uuid) -> StoreResult<Vec<Message>> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sessions WHERE id = $1)")
            .bind(session_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(StoreError::not_found("session", session_id));
        }

        let rows = sqlx::query(
            r#"
            SELECT id, session_id, role, content, timestamp
            FROM messages
            WHERE session_id = $1
            ORDER BY timestamp ASC, seq ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        rows.iter().map(message_from_row).collect()
    }

    async fn append_message(&self, message: &Message) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE sessions SET updated_at = $1 WHERE id = $2")
            .bind(message.timestamp)
            .bind(message.session_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::not_found("session", message.session_id));
        }

        sqlx::query(
            r#"
            INSERT INTO messages (id, session_id, role, content, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.session_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
