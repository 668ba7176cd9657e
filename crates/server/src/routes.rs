use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::ApiError;
use crate::models::{
    lookup_id, AppendMessageRequest, ChatRequest, ChatResponse, CreateSessionRequest,
    DocumentsResponse, MessagesResponse, RetrieveRequest, RetrieveResponse, SessionsResponse,
    UploadResponse,
};
use crate::AppState;

const UPLOAD_FIELD: &str = "file";

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::ValidationError(rejection.body_text()))
}

fn multipart_error(error: MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(error.body_text())
    } else {
        ApiError::ValidationError(error.body_text())
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "running",
        "message": "PDF chat backend is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn upload_pdf(
    State(service): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        debug!(file_name = %file_name, size = bytes.len(), "Received upload");

        let response = service.ingest_upload(file_name, bytes.to_vec()).await?;
        return Ok(Json(response));
    }

    warn!("Upload request without a file field");
    Err(ApiError::ValidationError("No file selected".to_string()))
}

pub async fn retrieve(
    State(service): State<AppState>,
    payload: Result<Json<RetrieveRequest>, JsonRejection>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    let request = json_body(payload)?.validate()?;
    Ok(Json(service.retrieve(request).await?))
}

pub async fn chat(
    State(service): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (query, session_id) = json_body(payload)?.validate()?;
    Ok(Json(service.chat(&query, &session_id).await?))
}

pub async fn list_sessions(
    State(service): State<AppState>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = service.list_sessions().await?;
    Ok(Json(SessionsResponse { sessions }))
}

pub async fn create_session(
    State(service): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let new_session = json_body(payload)?.validate()?;
    let session = service.create_session(new_session).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = lookup_id(&id, "session")?;
    Ok(Json(service.get_session(id).await?))
}

pub async fn delete_session(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = lookup_id(&id, "session")?;
    service.delete_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_messages(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let id = lookup_id(&id, "session")?;
    let messages = service.list_messages(id).await?;
    Ok(Json(MessagesResponse { messages }))
}

pub async fn append_message(
    State(service): State<AppState>,
    payload: Result<Json<AppendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let new_message = json_body(payload)?.validate()?;
    let message = service.append_message(new_message).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_documents(
    State(service): State<AppState>,
) -> Result<Json<DocumentsResponse>, ApiError> {
    let documents = service.list_documents().await?;
    Ok(Json(DocumentsResponse { documents }))
}

pub async fn get_document(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = lookup_id(&id, "document")?;
    Ok(Json(service.get_document(id).await?))
}

pub async fn delete_document(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = lookup_id(&id, "document")?;
    service.delete_document(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
