//! Database access for the Screening Manager
//!
//! SQLite via sqlx. Timestamps are RFC 3339 TEXT, identifiers are UUID
//! TEXT, and game/prediction JSON payloads are serialized TEXT columns.

pub mod assessments;
pub mod games;
pub mod predictions;
pub mod students;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool and create tables
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create Screening Manager tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            grade TEXT,
            screening_status TEXT NOT NULL DEFAULT 'pending',
            dyslexia_risk INTEGER,
            screening_confidence REAL,
            assessed_at TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assessments (
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            language TEXT NOT NULL,
            status TEXT NOT NULL,
            started_at TEXT NOT NULL,
            completed_at TEXT,
            duration_seconds INTEGER,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_assessments_student ON assessments(student_id, status)",
    )
    .execute(pool)
    .await?;

    // Composite key gives the upsert its one-row-per-slot guarantee
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assessment_games (
            id TEXT NOT NULL,
            assessment_id TEXT NOT NULL,
            game_number INTEGER NOT NULL,
            game_type TEXT NOT NULL,
            eye_tracking_data TEXT,
            speech_audio_url TEXT,
            speech_transcription TEXT,
            handwriting_strokes TEXT,
            response_data TEXT,
            completed_at TEXT NOT NULL,
            PRIMARY KEY (assessment_id, game_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ml_predictions (
            id TEXT PRIMARY KEY,
            assessment_id TEXT NOT NULL,
            student_id TEXT,
            prediction_type TEXT NOT NULL,
            risk_score REAL NOT NULL,
            confidence_score REAL NOT NULL,
            details TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_predictions_assessment ON ml_predictions(assessment_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (students, assessments, assessment_games, ml_predictions)");

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    init_tables(&pool).await.expect("Failed to init tables");
    pool
}
