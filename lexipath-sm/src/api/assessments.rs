//! Assessment API handlers
//!
//! POST /api/assessments/start
//! POST /api/assessments/{assessment_id}/games/{game_number}
//! POST /api/assessments/{assessment_id}/complete
//! GET  /api/assessments/{assessment_id}
//! GET  /api/students/{student_id}/assessments

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::GameSubmission,
    services::{AssessmentDetail, AssessmentSummary, CompletionResult, SessionView, SubmitResult},
    AppState,
};

/// POST /api/assessments/start request
#[derive(Debug, Deserialize)]
pub struct StartAssessmentRequest {
    pub student_id: Uuid,
    #[serde(default)]
    pub language: Option<String>,
}

/// POST /api/assessments/start
///
/// Creates a new screening for the student or resumes the open one;
/// repeated calls without submissions are stable.
pub async fn start_assessment(
    State(state): State<AppState>,
    Json(request): Json<StartAssessmentRequest>,
) -> ApiResult<Json<SessionView>> {
    let view = state
        .sessions
        .start_or_resume(request.student_id, request.language)
        .await?;
    Ok(Json(view))
}

/// POST /api/assessments/{assessment_id}/games/{game_number}
///
/// Records one game's data; games 1 and 2 are scored inline before the
/// response is sent, but scoring failure never fails the submission.
pub async fn submit_game(
    State(state): State<AppState>,
    Path((assessment_id, game_number)): Path<(Uuid, u8)>,
    Json(submission): Json<GameSubmission>,
) -> ApiResult<Json<SubmitResult>> {
    let result = state
        .sessions
        .submit_game(assessment_id, game_number, submission)
        .await?;
    Ok(Json(result))
}

/// POST /api/assessments/{assessment_id}/complete
pub async fn complete_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> ApiResult<Json<CompletionResult>> {
    let result = state.sessions.complete(assessment_id).await?;
    Ok(Json(result))
}

/// GET /api/assessments/{assessment_id}
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> ApiResult<Json<AssessmentDetail>> {
    let detail = state.sessions.get_by_id(assessment_id).await?;
    Ok(Json(detail))
}

/// GET /api/students/{student_id}/assessments
pub async fn list_student_assessments(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AssessmentSummary>>> {
    let summaries = state.sessions.list_for_student(student_id).await?;
    Ok(Json(summaries))
}

/// Build assessment routes
pub fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/assessments/start", post(start_assessment))
        .route(
            "/api/assessments/:assessment_id/games/:game_number",
            post(submit_game),
        )
        .route(
            "/api/assessments/:assessment_id/complete",
            post(complete_assessment),
        )
        .route("/api/assessments/:assessment_id", get(get_assessment))
        .route(
            "/api/students/:student_id/assessments",
            get(list_student_assessments),
        )
}
