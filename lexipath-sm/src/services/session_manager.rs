//! Assessment session manager
//!
//! Owns the state machine for a single student's screening attempt:
//! creation, resumption, per-game submission, completion, and result
//! aggregation. Per-game ML scoring is synchronous within the request
//! but never fails a submission; completion never rolls back once the
//! status flips, even if the final aggregation cannot be scored.

use chrono::{DateTime, Utc};
use lexipath_common::{time, Error, Result};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::{self, GameInfo, GameType, TOTAL_GAMES};
use crate::db;
use crate::models::{
    Assessment, AssessmentGame, AssessmentStatus, GameSubmission, MlPrediction, PredictionType,
    Student,
};
use crate::services::scorer_client::{ScorerClient, ScorerResult};

/// Fixed confidence weight stored with eye-tracking predictions
const EYE_TRACKING_CONFIDENCE: f64 = 0.85;

/// Fixed confidence weight stored with speech predictions
const SPEECH_CONFIDENCE: f64 = 0.80;

/// View returned by start-or-resume
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub assessment_id: Uuid,
    pub student_id: Uuid,
    pub language: String,
    pub status: AssessmentStatus,
    pub started_at: DateTime<Utc>,
    pub current_game: u8,
    pub total_games: u8,
    pub game: Option<GameInfo>,
}

/// View returned by a per-game submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResult {
    pub game_id: Uuid,
    pub game_number: u8,
    pub status: String,
    pub is_last_game: bool,
    pub next_game: Option<GameInfo>,
}

/// View returned by completion
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub assessment_id: Uuid,
    pub status: AssessmentStatus,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub games_completed: usize,
}

/// Student fields exposed on the assessment detail view
#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub age: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl From<Student> for StudentSummary {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            age: student.age,
            grade: student.grade,
        }
    }
}

/// Full assessment detail: games and predictions included
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentDetail {
    #[serde(flatten)]
    pub assessment: Assessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentSummary>,
    pub games: Vec<AssessmentGame>,
    pub predictions: Vec<MlPrediction>,
}

/// Per-game brief on the assessment list view
#[derive(Debug, Clone, Serialize)]
pub struct GameBrief {
    pub game_number: u8,
    pub game_type: GameType,
    pub completed_at: DateTime<Utc>,
}

/// One row of a student's assessment history
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub games: Vec<GameBrief>,
}

/// The assessment orchestration core
#[derive(Clone)]
pub struct SessionManager {
    db: SqlitePool,
    scorer: Arc<ScorerClient>,
    public_base_url: String,
}

impl SessionManager {
    pub fn new(db: SqlitePool, scorer: Arc<ScorerClient>, public_base_url: String) -> Self {
        Self {
            db,
            scorer,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Start a new screening or resume the student's open one
    ///
    /// Safe to call repeatedly: without intervening submissions the
    /// result is stable and no duplicate assessment rows are created.
    pub async fn start_or_resume(
        &self,
        student_id: Uuid,
        language: Option<String>,
    ) -> Result<SessionView> {
        db::students::find_student(&self.db, student_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Student not found: {}", student_id)))?;

        // A completed screening is terminal: report it unchanged
        if let Some(completed) =
            db::assessments::latest_completed_for_student(&self.db, student_id).await?
        {
            return Ok(Self::completed_view(completed));
        }

        if let Some(existing) =
            db::assessments::latest_in_progress_for_student(&self.db, student_id).await?
        {
            let completed_games = db::games::count_games(&self.db, existing.id).await?;
            if completed_games >= TOTAL_GAMES as i64 {
                // All slots filled but the explicit complete call never
                // arrived: report as completed rather than a sixth game
                return Ok(Self::completed_view(existing));
            }

            let next_game_number = completed_games as u8 + 1;
            let game = catalog::game_info(&existing.language, next_game_number);

            tracing::info!(
                assessment_id = %existing.id,
                student_id = %student_id,
                next_game = next_game_number,
                "Resuming in-progress assessment"
            );

            return Ok(SessionView {
                assessment_id: existing.id,
                student_id: existing.student_id,
                language: existing.language,
                status: existing.status,
                started_at: existing.started_at,
                current_game: next_game_number,
                total_games: TOTAL_GAMES,
                game,
            });
        }

        let language = language
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| catalog::DEFAULT_LANGUAGE.to_string());
        let assessment = Assessment::new(student_id, language);
        db::assessments::insert_assessment(&self.db, &assessment).await?;

        tracing::info!(
            assessment_id = %assessment.id,
            student_id = %student_id,
            language = %assessment.language,
            "Created new assessment"
        );

        let game = catalog::game_info(&assessment.language, 1);
        Ok(SessionView {
            assessment_id: assessment.id,
            student_id: assessment.student_id,
            language: assessment.language,
            status: assessment.status,
            started_at: assessment.started_at,
            current_game: 1,
            total_games: TOTAL_GAMES,
            game,
        })
    }

    /// Record one game's data, scoring games 1 and 2 along the way
    pub async fn submit_game(
        &self,
        assessment_id: Uuid,
        game_number: u8,
        mut submission: GameSubmission,
    ) -> Result<SubmitResult> {
        let game_type = GameType::for_game(game_number)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid game number: {}", game_number)))?;

        let assessment = db::assessments::find_assessment(&self.db, assessment_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Assessment not found: {}", assessment_id)))?;

        if assessment.status != AssessmentStatus::InProgress {
            return Err(Error::InvalidInput(
                "Assessment is not in progress".to_string(),
            ));
        }

        // Per-game scoring: synchronous, but a failure here never fails
        // the submission itself
        if game_number == 1 {
            if let Err(e) = self.score_reading(assessment.id, &mut submission).await {
                tracing::warn!(
                    assessment_id = %assessment.id,
                    error = %e,
                    "Storing reading analysis side effects failed"
                );
            }
        }
        if game_number == 2 {
            if let Err(e) = self.score_speech(assessment.id, &mut submission).await {
                tracing::warn!(
                    assessment_id = %assessment.id,
                    error = %e,
                    "Storing speech analysis side effects failed"
                );
            }
        }

        let game = AssessmentGame {
            id: Uuid::new_v4(),
            assessment_id: assessment.id,
            game_number,
            game_type,
            eye_tracking_data: submission.eye_tracking_data,
            speech_audio_url: submission.speech_audio_url,
            speech_transcription: submission.speech_transcription,
            handwriting_strokes: submission.handwriting_strokes,
            response_data: submission.response_data,
            completed_at: time::now(),
        };
        let stored = db::games::upsert_game(&self.db, &game).await?;

        let is_last_game = game_number == TOTAL_GAMES;
        let next_game = if is_last_game {
            None
        } else {
            catalog::game_info(&assessment.language, game_number + 1)
        };

        tracing::info!(
            assessment_id = %assessment.id,
            game_number = game_number,
            is_last_game = is_last_game,
            "Game submission recorded"
        );

        Ok(SubmitResult {
            game_id: stored.id,
            game_number: stored.game_number,
            status: "completed".to_string(),
            is_last_game,
            next_game,
        })
    }

    /// Complete the assessment and aggregate the final screening risk
    ///
    /// A best-effort screening is produced even for partial attempts;
    /// only an assessment with zero recorded games is rejected. Once the
    /// status flips to completed it is never rolled back: aggregation
    /// scoring and the student risk-field update are logged-and-swallowed
    /// on failure, so callers must treat the `screening_overall`
    /// prediction as eventually consistent.
    pub async fn complete(&self, assessment_id: Uuid) -> Result<CompletionResult> {
        let assessment = db::assessments::find_assessment(&self.db, assessment_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Assessment not found: {}", assessment_id)))?;

        let games = db::games::list_games(&self.db, assessment.id).await?;
        if games.is_empty() {
            return Err(Error::InvalidInput("No games completed".to_string()));
        }

        let completed_at = time::now();
        let duration_seconds = (completed_at - assessment.started_at).num_seconds().max(0);
        db::assessments::mark_completed(&self.db, assessment.id, completed_at, duration_seconds)
            .await?;

        tracing::info!(
            assessment_id = %assessment.id,
            games_completed = games.len(),
            duration_seconds = duration_seconds,
            "Assessment completed"
        );

        if let Err(e) = self.aggregate_screening(&assessment, &games).await {
            tracing::error!(
                assessment_id = %assessment.id,
                error = %e,
                "Final screening aggregation failed; assessment stays completed"
            );
        }

        Ok(CompletionResult {
            assessment_id: assessment.id,
            status: AssessmentStatus::Completed,
            completed_at,
            duration_seconds,
            games_completed: games.len(),
        })
    }

    /// Assessment detail: student summary, games, predictions
    pub async fn get_by_id(&self, assessment_id: Uuid) -> Result<AssessmentDetail> {
        let assessment = db::assessments::find_assessment(&self.db, assessment_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Assessment not found: {}", assessment_id)))?;

        let student = db::students::find_student(&self.db, assessment.student_id)
            .await?
            .map(StudentSummary::from);
        let games = db::games::list_games(&self.db, assessment.id).await?;
        let predictions = db::predictions::list_predictions(&self.db, assessment.id).await?;

        Ok(AssessmentDetail {
            assessment,
            student,
            games,
            predictions,
        })
    }

    /// A student's assessment history, newest first
    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<AssessmentSummary>> {
        let assessments = db::assessments::list_for_student(&self.db, student_id).await?;

        let mut summaries = Vec::with_capacity(assessments.len());
        for assessment in assessments {
            let games = db::games::list_games(&self.db, assessment.id)
                .await?
                .into_iter()
                .map(|game| GameBrief {
                    game_number: game.game_number,
                    game_type: game.game_type,
                    completed_at: game.completed_at,
                })
                .collect();

            summaries.push(AssessmentSummary { assessment, games });
        }

        Ok(summaries)
    }

    fn completed_view(assessment: Assessment) -> SessionView {
        SessionView {
            assessment_id: assessment.id,
            student_id: assessment.student_id,
            language: assessment.language,
            status: AssessmentStatus::Completed,
            started_at: assessment.started_at,
            current_game: TOTAL_GAMES,
            total_games: TOTAL_GAMES,
            game: None,
        }
    }

    /// Game 1 side effects: reading-pattern analysis and its prediction
    async fn score_reading(
        &self,
        assessment_id: Uuid,
        submission: &mut GameSubmission,
    ) -> Result<()> {
        let Some(eye_tracking) = submission.eye_tracking_data.as_mut() else {
            return Ok(());
        };
        if eye_tracking.raw_points.is_empty() {
            return Ok(());
        }

        let screen = submission.screen_dimensions.unwrap_or_default();
        let outcome = self
            .scorer
            .analyze_reading_patterns(
                &eye_tracking.raw_points,
                screen,
                submission.text_bounding_box,
            )
            .await;

        let analysis = outcome.into_value();
        let prediction = MlPrediction::new(
            assessment_id,
            None,
            PredictionType::DyslexiaRiskEyeTracking,
            analysis.dyslexia_risk_score,
            EYE_TRACKING_CONFIDENCE,
            Some(serde_json::to_value(&analysis)?),
        );
        db::predictions::insert_prediction(&self.db, &prediction).await?;

        eye_tracking.analysis = Some(analysis);
        Ok(())
    }

    /// Game 2 side effects: speech-fluency analysis and its prediction
    ///
    /// Risk proxy is 1 − fluency, so lower fluency implies higher risk.
    async fn score_speech(
        &self,
        assessment_id: Uuid,
        submission: &mut GameSubmission,
    ) -> Result<()> {
        let Some(audio_url) = submission.speech_audio_url.clone() else {
            return Ok(());
        };

        let full_url = self.absolutize_media_url(&audio_url);
        tracing::debug!(audio_url = %full_url, "Triggering speech analysis");
        let outcome = self.scorer.analyze_speech(&full_url).await;

        let risk_score = (1.0 - outcome.value().fluency_score).clamp(0.0, 1.0);
        let prediction = MlPrediction::new(
            assessment_id,
            None,
            PredictionType::DyslexiaRiskSpeech,
            risk_score,
            SPEECH_CONFIDENCE,
            Some(serde_json::to_value(outcome.value())?),
        );
        db::predictions::insert_prediction(&self.db, &prediction).await?;

        // Attach the transcription only when the scorer really produced one
        if let ScorerResult::Scored(analysis) = outcome {
            if !analysis.transcription.is_empty() {
                submission.speech_transcription = Some(analysis.transcription);
            }
        }
        Ok(())
    }

    /// Final aggregation: overall prediction plus student risk fields
    async fn aggregate_screening(
        &self,
        assessment: &Assessment,
        games: &[AssessmentGame],
    ) -> Result<()> {
        let student = db::students::find_student(&self.db, assessment.student_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Student not found: {}", assessment.student_id))
            })?;

        let games_data = build_games_data(games);
        let outcome = self
            .scorer
            .predict_screening_risk(student.age, "unknown", &games_data)
            .await;
        let risk = outcome.value();

        let prediction = MlPrediction::new(
            assessment.id,
            Some(student.id),
            PredictionType::ScreeningOverall,
            risk.risk_score,
            risk.confidence,
            Some(serde_json::to_value(risk)?),
        );
        db::predictions::insert_prediction(&self.db, &prediction).await?;

        let dyslexia_risk = (risk.risk_score * 100.0).round() as i64;
        db::students::update_screening_fields(
            &self.db,
            student.id,
            dyslexia_risk,
            risk.confidence,
            time::now(),
        )
        .await?;

        tracing::info!(
            assessment_id = %assessment.id,
            risk_score = risk.risk_score,
            confidence = risk.confidence,
            degraded = outcome.is_degraded(),
            "Overall screening prediction stored"
        );
        Ok(())
    }

    fn absolutize_media_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.public_base_url, url)
        } else {
            format!("{}/{}", self.public_base_url, url)
        }
    }
}

/// Per-game summary object keyed `game{n}` for the aggregate scorer call
fn build_games_data(games: &[AssessmentGame]) -> Value {
    let mut games_data = serde_json::Map::new();
    for game in games {
        let speech_fluency = game.speech_audio_url.as_ref().map(|url| {
            json!({
                "url": url,
                "transcription": game.speech_transcription,
            })
        });

        games_data.insert(
            format!("game{}", game.game_number),
            json!({
                "game_type": game.game_type.as_str(),
                "eye_tracking_data": game.eye_tracking_data,
                "speech_fluency": speech_fluency,
                "handwriting_strokes": game.handwriting_strokes,
                "response_data": game.response_data,
            }),
        );
    }
    Value::Object(games_data)
}
