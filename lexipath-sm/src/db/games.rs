//! Assessment game row operations
//!
//! Games are keyed by (assessment_id, game_number). Submission uses a
//! single-statement upsert: a resubmission overwrites the payload columns
//! but keeps the original row id.

use lexipath_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::catalog::GameType;
use crate::models::{AssessmentGame, EyeTrackingData};

/// Insert or overwrite the game slot, returning the stored row
///
/// The upsert is one atomic statement; concurrent submissions for the
/// same slot race last-write-wins.
pub async fn upsert_game(pool: &SqlitePool, game: &AssessmentGame) -> Result<AssessmentGame> {
    // Prepare serialized payloads before binding
    let eye_tracking_data = game
        .eye_tracking_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let handwriting_strokes = game
        .handwriting_strokes
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let response_data = game
        .response_data
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO assessment_games (
            id, assessment_id, game_number, game_type,
            eye_tracking_data, speech_audio_url, speech_transcription,
            handwriting_strokes, response_data, completed_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(assessment_id, game_number) DO UPDATE SET
            eye_tracking_data = excluded.eye_tracking_data,
            speech_audio_url = excluded.speech_audio_url,
            speech_transcription = excluded.speech_transcription,
            handwriting_strokes = excluded.handwriting_strokes,
            response_data = excluded.response_data,
            completed_at = excluded.completed_at
        "#,
    )
    .bind(game.id.to_string())
    .bind(game.assessment_id.to_string())
    .bind(game.game_number as i64)
    .bind(game.game_type.as_str())
    .bind(&eye_tracking_data)
    .bind(&game.speech_audio_url)
    .bind(&game.speech_transcription)
    .bind(&handwriting_strokes)
    .bind(&response_data)
    .bind(time::to_column(game.completed_at))
    .execute(pool)
    .await?;

    // Re-read so the caller sees the stored row (id is stable across overwrites)
    find_game(pool, game.assessment_id, game.game_number)
        .await?
        .ok_or_else(|| Error::Internal("Upserted game row missing".to_string()))
}

/// Load one game slot
pub async fn find_game(
    pool: &SqlitePool,
    assessment_id: Uuid,
    game_number: u8,
) -> Result<Option<AssessmentGame>> {
    let row = sqlx::query(
        r#"
        SELECT id, assessment_id, game_number, game_type,
               eye_tracking_data, speech_audio_url, speech_transcription,
               handwriting_strokes, response_data, completed_at
        FROM assessment_games
        WHERE assessment_id = ? AND game_number = ?
        "#,
    )
    .bind(assessment_id.to_string())
    .bind(game_number as i64)
    .fetch_optional(pool)
    .await?;

    row.map(game_from_row).transpose()
}

/// All games of an assessment, ordered by game number
pub async fn list_games(pool: &SqlitePool, assessment_id: Uuid) -> Result<Vec<AssessmentGame>> {
    let rows = sqlx::query(
        r#"
        SELECT id, assessment_id, game_number, game_type,
               eye_tracking_data, speech_audio_url, speech_transcription,
               handwriting_strokes, response_data, completed_at
        FROM assessment_games
        WHERE assessment_id = ?
        ORDER BY game_number ASC
        "#,
    )
    .bind(assessment_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(game_from_row).collect()
}

/// Number of recorded games for an assessment
pub async fn count_games(pool: &SqlitePool, assessment_id: Uuid) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM assessment_games WHERE assessment_id = ?")
            .bind(assessment_id.to_string())
            .fetch_one(pool)
            .await?;

    Ok(count)
}

fn game_from_row(row: sqlx::sqlite::SqliteRow) -> Result<AssessmentGame> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse game id: {}", e)))?;

    let assessment_id: String = row.get("assessment_id");
    let assessment_id = Uuid::parse_str(&assessment_id)
        .map_err(|e| Error::Internal(format!("Failed to parse assessment_id: {}", e)))?;

    let game_type: String = row.get("game_type");
    let game_type = GameType::parse(&game_type)
        .ok_or_else(|| Error::Internal(format!("Unknown game type: {}", game_type)))?;

    let eye_tracking_data: Option<String> = row.get("eye_tracking_data");
    let eye_tracking_data: Option<EyeTrackingData> = eye_tracking_data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    let handwriting_strokes: Option<String> = row.get("handwriting_strokes");
    let handwriting_strokes = handwriting_strokes
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    let response_data: Option<String> = row.get("response_data");
    let response_data = response_data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    let completed_at: String = row.get("completed_at");

    Ok(AssessmentGame {
        id,
        assessment_id,
        game_number: row.get::<i64, _>("game_number") as u8,
        game_type,
        eye_tracking_data,
        speech_audio_url: row.get("speech_audio_url"),
        speech_transcription: row.get("speech_transcription"),
        handwriting_strokes,
        response_data,
        completed_at: time::from_column(&completed_at)?,
    })
}
