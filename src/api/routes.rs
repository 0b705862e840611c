//! Route table and handlers

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controller::SessionSnapshot;
use crate::error::{AppError, Result};
use crate::styles::StyleDescriptor;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectStyleRequest {
    pub style_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub instruction: String,
}

#[derive(Debug, Serialize)]
pub struct StylesResponse {
    pub version: u32,
    pub styles: Vec<StyleDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.settings.upload.max_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/styles", get(list_styles))
        .route("/session", get(get_session))
        .route("/session/upload", post(upload))
        .route("/session/style", post(select_style))
        .route("/session/generate", post(generate))
        .route("/session/edit", post(edit))
        .route("/session/error", delete(dismiss_error))
        .route("/session/reset", post(start_over))
        .route("/session/download", get(download))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn list_styles(State(state): State<Arc<AppState>>) -> Json<StylesResponse> {
    let catalog = state.controller.catalog();
    Json(StylesResponse {
        version: catalog.version(),
        styles: catalog.all().to_vec(),
    })
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.controller.snapshot())
}

async fn upload(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Json<SessionSnapshot> {
    // Browsers send octet-stream for unknown files; let the bytes decide.
    let declared = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.starts_with("application/octet-stream"));
    Json(state.controller.upload(body.to_vec(), declared))
}

async fn select_style(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectStyleRequest>,
) -> Json<SessionSnapshot> {
    Json(state.controller.select_style(&request.style_id))
}

async fn generate(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.controller.generate().await)
}

async fn edit(State(state): State<Arc<AppState>>, Json(request): Json<EditRequest>) -> Json<SessionSnapshot> {
    Json(state.controller.edit(&request.instruction).await)
}

async fn dismiss_error(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.controller.dismiss_error())
}

async fn start_over(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.controller.start_over())
}

async fn download(State(state): State<Arc<AppState>>) -> Result<Response> {
    let artifact = state.controller.download()?;

    let content_type = HeaderValue::from_str(&artifact.mime_type)
        .map_err(|e| AppError::Internal(format!("Invalid content type: {}", e)))?;
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", artifact.filename))
        .map_err(|e| AppError::Internal(format!("Invalid filename: {}", e)))?;

    Ok((
        [(CONTENT_TYPE, content_type), (CONTENT_DISPOSITION, disposition)],
        artifact.bytes,
    )
        .into_response())
}
