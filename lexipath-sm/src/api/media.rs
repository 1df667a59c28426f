//! Media upload handler
//!
//! POST /api/media/audio accepts a raw audio body and returns the stored
//! URL. Storage failure is logged and reported as `url: null` so the
//! client submits the game without an audio reference instead of being
//! blocked.

use axum::{
    body::Bytes,
    extract::State,
    http::header::CONTENT_TYPE,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::services::media_store::extension_for_content_type;
use crate::AppState;

/// POST /api/media/audio response
#[derive(Debug, Serialize)]
pub struct UploadAudioResponse {
    pub url: Option<String>,
}

/// POST /api/media/audio
pub async fn upload_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<UploadAudioResponse> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    let extension = extension_for_content_type(content_type);

    match state.media.save_audio(&body, extension).await {
        Ok(url) => Json(UploadAudioResponse { url: Some(url) }),
        Err(e) => {
            tracing::warn!(error = %e, "Audio upload failed; returning empty reference");
            Json(UploadAudioResponse { url: None })
        }
    }
}

/// Build media routes
pub fn media_routes() -> Router<AppState> {
    Router::new().route("/api/media/audio", post(upload_audio))
}
