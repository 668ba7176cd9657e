pub mod errors;
pub mod models;
pub mod routes;
pub mod service;
pub mod telemetry;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use chat_core::ServerConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use errors::ApiError;
pub use service::ChatService;

pub type AppState = Arc<ChatService>;

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect();
    cors.allow_origin(origins)
}

pub fn create_app(service: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/upload-pdf", post(routes::upload_pdf))
        .route("/retrieve", post(routes::retrieve))
        .route("/chat", post(routes::chat))
        .route(
            "/sessions",
            get(routes::list_sessions).post(routes::create_session),
        )
        .route(
            "/sessions/:id",
            get(routes::get_session).delete(routes::delete_session),
        )
        .route("/sessions/:id/messages", get(routes::list_messages))
        .route("/messages", post(routes::append_message))
        .route("/documents", get(routes::list_documents))
        .route(
            "/documents/:id",
            get(routes::get_document).delete(routes::delete_document),
        )
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(service)
}
