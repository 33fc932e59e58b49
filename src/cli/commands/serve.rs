//! HTTP API server.
//!
//! Exposes the agent, the chat flashcards and document indexing over REST.

use crate::agent::{ActiveModes, FinalResponse, ToolInfo};
use crate::ai::ChatMessage;
use crate::cli::{preflight, Output, LOCAL_USER};
use crate::config::Settings;
use crate::runtime::Runtime;
use crate::store::Flashcard;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    runtime: Runtime,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check_api_key() {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }
    for warning in preflight::optional_warnings(&settings) {
        Output::warning(&warning);
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let state = Arc::new(AppState {
        runtime: Runtime::new(settings)?,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/chats/{chat_id}/messages", post(send_message))
        .route("/chats/{chat_id}/flashcards", get(list_flashcards))
        .route("/chats/{chat_id}/documents", post(index_document))
        .route("/diagrams/{image_id}", get(get_diagram))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Tutorly API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Tools", "GET  /tools");
    Output::kv("Send message", "POST /chats/:chat_id/messages");
    Output::kv("Flashcards", "GET  /chats/:chat_id/flashcards");
    Output::kv("Index document", "POST /chats/:chat_id/documents");
    Output::kv("Diagram image", "GET  /diagrams/:image_id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct MessageRequest {
    message: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    history: Vec<ChatMessage>,
    #[serde(default)]
    modes: ActiveModes,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct DocumentRequest {
    name: String,
    text: String,
}

#[derive(Serialize)]
struct DocumentResponse {
    chunks_indexed: usize,
}

#[derive(Serialize)]
struct FlashcardsResponse {
    flashcards: Vec<Flashcard>,
    total: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn internal_error(e: impl std::fmt::Display) -> axum::response::Response {
    error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Vec<ToolInfo>> {
    Json(state.runtime.agent().available_tools())
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Message must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let user_id = req.user_id.as_deref().unwrap_or(LOCAL_USER);
    let result: crate::Result<FinalResponse> = state
        .runtime
        .handle_message(&chat_id, user_id, req.history, &req.message, &req.modes)
        .await;

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn list_flashcards(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> impl IntoResponse {
    match state.runtime.flashcards().list(&chat_id).await {
        Ok(flashcards) => Json(FlashcardsResponse {
            total: flashcards.len(),
            flashcards,
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn index_document(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(req): Json<DocumentRequest>,
) -> impl IntoResponse {
    match state
        .runtime
        .documents()
        .index_document(&chat_id, &req.name, &req.text)
        .await
    {
        Ok(chunks_indexed) => Json(DocumentResponse { chunks_indexed }).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn get_diagram(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
) -> impl IntoResponse {
    if uuid::Uuid::parse_str(&image_id).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid diagram id: {}", image_id),
            }),
        )
            .into_response();
    }

    match tokio::fs::read(state.runtime.diagram_path(&image_id)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Diagram not found: {}", image_id),
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}
