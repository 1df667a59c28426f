//! Assessment row operations

use chrono::{DateTime, Utc};
use lexipath_common::{time, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Assessment, AssessmentStatus};

/// Insert a new assessment row
pub async fn insert_assessment(pool: &SqlitePool, assessment: &Assessment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO assessments (id, student_id, language, status, started_at, completed_at, duration_seconds, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(assessment.id.to_string())
    .bind(assessment.student_id.to_string())
    .bind(&assessment.language)
    .bind(assessment.status.as_str())
    .bind(time::to_column(assessment.started_at))
    .bind(assessment.completed_at.map(time::to_column))
    .bind(assessment.duration_seconds)
    .bind(time::to_column(assessment.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load an assessment by id
pub async fn find_assessment(pool: &SqlitePool, id: Uuid) -> Result<Option<Assessment>> {
    let row = sqlx::query(
        r#"
        SELECT id, student_id, language, status, started_at, completed_at, duration_seconds, created_at
        FROM assessments
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(assessment_from_row).transpose()
}

/// Most recently completed assessment for a student, if any
pub async fn latest_completed_for_student(
    pool: &SqlitePool,
    student_id: Uuid,
) -> Result<Option<Assessment>> {
    let row = sqlx::query(
        r#"
        SELECT id, student_id, language, status, started_at, completed_at, duration_seconds, created_at
        FROM assessments
        WHERE student_id = ? AND status = 'completed'
        ORDER BY completed_at DESC
        LIMIT 1
        "#,
    )
    .bind(student_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(assessment_from_row).transpose()
}

/// Most recent in-progress assessment for a student, if any
pub async fn latest_in_progress_for_student(
    pool: &SqlitePool,
    student_id: Uuid,
) -> Result<Option<Assessment>> {
    let row = sqlx::query(
        r#"
        SELECT id, student_id, language, status, started_at, completed_at, duration_seconds, created_at
        FROM assessments
        WHERE student_id = ? AND status = 'in_progress'
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(student_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(assessment_from_row).transpose()
}

/// All assessments for a student, newest first
pub async fn list_for_student(pool: &SqlitePool, student_id: Uuid) -> Result<Vec<Assessment>> {
    let rows = sqlx::query(
        r#"
        SELECT id, student_id, language, status, started_at, completed_at, duration_seconds, created_at
        FROM assessments
        WHERE student_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(student_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(assessment_from_row).collect()
}

/// Mark an assessment completed with its final duration
pub async fn mark_completed(
    pool: &SqlitePool,
    id: Uuid,
    completed_at: DateTime<Utc>,
    duration_seconds: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE assessments
        SET status = 'completed', completed_at = ?, duration_seconds = ?
        WHERE id = ?
        "#,
    )
    .bind(time::to_column(completed_at))
    .bind(duration_seconds)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

fn assessment_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Assessment> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| lexipath_common::Error::Internal(format!("Failed to parse id: {}", e)))?;

    let student_id: String = row.get("student_id");
    let student_id = Uuid::parse_str(&student_id).map_err(|e| {
        lexipath_common::Error::Internal(format!("Failed to parse student_id: {}", e))
    })?;

    let status: String = row.get("status");
    let status = AssessmentStatus::parse(&status).ok_or_else(|| {
        lexipath_common::Error::Internal(format!("Unknown assessment status: {}", status))
    })?;

    let started_at: String = row.get("started_at");
    let created_at: String = row.get("created_at");
    let completed_at: Option<String> = row.get("completed_at");

    Ok(Assessment {
        id,
        student_id,
        language: row.get("language"),
        status,
        started_at: time::from_column(&started_at)?,
        completed_at: time::from_column_opt(completed_at)?,
        duration_seconds: row.get("duration_seconds"),
        created_at: time::from_column(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find_round_trip() {
        let pool = crate::db::test_pool().await;
        let assessment = Assessment::new(Uuid::new_v4(), "en".to_string());

        insert_assessment(&pool, &assessment).await.unwrap();
        let loaded = find_assessment(&pool, assessment.id).await.unwrap().unwrap();

        assert_eq!(loaded.id, assessment.id);
        assert_eq!(loaded.student_id, assessment.student_id);
        assert_eq!(loaded.status, AssessmentStatus::InProgress);
        assert_eq!(loaded.started_at, assessment.started_at);
        assert!(loaded.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let pool = crate::db::test_pool().await;
        assert!(find_assessment(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_filters() {
        let pool = crate::db::test_pool().await;
        let student_id = Uuid::new_v4();
        let assessment = Assessment::new(student_id, "en".to_string());
        insert_assessment(&pool, &assessment).await.unwrap();

        assert!(latest_in_progress_for_student(&pool, student_id)
            .await
            .unwrap()
            .is_some());
        assert!(latest_completed_for_student(&pool, student_id)
            .await
            .unwrap()
            .is_none());

        let completed_at = time::now();
        mark_completed(&pool, assessment.id, completed_at, 42).await.unwrap();

        assert!(latest_in_progress_for_student(&pool, student_id)
            .await
            .unwrap()
            .is_none());
        let completed = latest_completed_for_student(&pool, student_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, AssessmentStatus::Completed);
        assert_eq!(completed.duration_seconds, Some(42));
        assert_eq!(completed.completed_at, Some(completed_at));
    }
}
