// SYNOID Storyboard Server
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use axum::{
    extract::{Path as UrlPath, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::catalog::{ClipCatalog, VIDEO_EXTENSIONS};
use crate::engine::{ClipRecord, ScriptInput, Storyboard, StoryboardEngine};
use crate::errors::StoryboardError;
use crate::export::transcript;
use crate::usage::{self, UsageReport};

pub struct AppState {
    pub catalog: Arc<dyn ClipCatalog>,
    pub engine: StoryboardEngine,
    pub asset_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub title: String,
    #[serde(flatten)]
    pub input: ScriptInput,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error responses carry the message verbatim.
pub struct ApiError(StoryboardError);

impl From<StoryboardError> for ApiError {
    fn from(e: StoryboardError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoryboardError::NoClipsAvailable
            | StoryboardError::MatchingInputInvalid { .. }
            | StoryboardError::NarrationTooLong { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            StoryboardError::ExternalStoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("[SERVER] {} {}", status, self.0);
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/library", get(get_library))
        .route("/api/storyboard", post(generate_storyboard))
        .route("/api/storyboard/confirm", post(confirm_storyboard))
        .route("/api/storyboard/transcript", post(download_transcript))
        .route("/api/preview/*id", get(preview_clip))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

pub async fn start_server(port: u16, state: SharedState) -> std::io::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let display_addr = if addr.ip().is_unspecified() {
        format!("127.0.0.1:{}", port)
    } else {
        addr.to_string()
    };
    info!("[SERVER] Storyboard API running on http://{}", display_addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn get_library(State(state): State<SharedState>) -> Result<Json<Vec<ClipRecord>>, ApiError> {
    Ok(Json(state.catalog.list_clips().await?))
}

async fn generate_storyboard(
    State(state): State<SharedState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<Storyboard>, ApiError> {
    info!("[SERVER] Generating storyboard '{}'", payload.title);
    let board = state
        .engine
        .generate(&payload.title, &payload.input, state.catalog.as_ref())
        .await?;
    Ok(Json(board))
}

async fn confirm_storyboard(
    State(state): State<SharedState>,
    Json(board): Json<Storyboard>,
) -> Json<UsageReport> {
    Json(usage::confirm(state.catalog.as_ref(), board).await)
}

async fn download_transcript(Json(board): Json<Storyboard>) -> impl IntoResponse {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        transcript::file_name(&board.title)
    );
    (
        [
            (header::CONTENT_TYPE, format!("{}; charset=utf-8", transcript::MIME)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        transcript::render(&board.title, &board.selections),
    )
}

/// Clip ids are relative paths; anything that could leave the asset root,
/// or is not a video, is refused.
fn validate_clip_path(id: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(id);

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err("Access denied: Path traversal detected".to_string()),
        }
    }
    if path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true)
    {
        return Err("Access denied: Hidden or empty file name".to_string());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext {
        Some(e) if VIDEO_EXTENSIONS.contains(&e.as_str()) => Ok(path),
        Some(e) => Err(format!("Access denied: Invalid file extension '.{}'", e)),
        None => Err("Access denied: No file extension provided".to_string()),
    }
}

async fn preview_clip(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<String>,
    req: Request,
) -> Response {
    let relative = match validate_clip_path(&id) {
        Ok(p) => p,
        Err(e) => {
            warn!("[SERVER] Preview refused for '{}': {}", id, e);
            return (StatusCode::FORBIDDEN, e).into_response();
        }
    };

    let path = Path::new(&state.asset_dir).join(relative);
    if !path.is_file() {
        return StatusCode::NOT_FOUND.into_response();
    }

    let service = tower_http::services::ServeFile::new(path);
    match service.oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(err) => {
            error!("[SERVER] ServeFile error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
