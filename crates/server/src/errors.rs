use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use ingest::IngestError;
use serde_json::json;
use store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("{0}")]
    InvalidFileType(String),

    #[error("Could not extract text from PDF")]
    NoTextExtracted,

    #[error("{0}")]
    NotFound(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Returns the appropriate HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) => 400,
            ApiError::InvalidFileType(_) => 400,
            ApiError::NoTextExtracted => 422,
            ApiError::NotFound(_) => 404,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::StorageError(_) => 500,
            ApiError::InternalError(_) => 500,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({ "error": self.to_string() })
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => ApiError::NotFound(error.to_string()),
            StoreError::InvalidRecord(message) => ApiError::ValidationError(message),
            StoreError::Database(_) | StoreError::Migration(_) => {
                ApiError::StorageError(error.to_string())
            }
            StoreError::UnsupportedUrl(_) => ApiError::InternalError(error.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::EmptyFileName => ApiError::ValidationError(error.to_string()),
            IngestError::InvalidFileType(..) => ApiError::InvalidFileType(error.to_string()),
            IngestError::NoTextExtracted => ApiError::NoTextExtracted,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(self.to_json())).into_response()
    }
}
