//! Student row operations
//!
//! The Screening Manager reads students for identity/age and writes back
//! only the cached screening risk fields.

use chrono::{DateTime, Utc};
use lexipath_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::Student;

/// Insert a student row (seed/test surface; students are owned upstream)
pub async fn insert_student(pool: &SqlitePool, student: &Student) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO students (
            id, name, age, grade, screening_status,
            dyslexia_risk, screening_confidence, assessed_at, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(student.id.to_string())
    .bind(&student.name)
    .bind(student.age)
    .bind(&student.grade)
    .bind(&student.screening_status)
    .bind(student.dyslexia_risk)
    .bind(student.screening_confidence)
    .bind(student.assessed_at.map(time::to_column))
    .bind(time::to_column(student.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a student by id
pub async fn find_student(pool: &SqlitePool, id: Uuid) -> Result<Option<Student>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, age, grade, screening_status,
               dyslexia_risk, screening_confidence, assessed_at, created_at
        FROM students
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(student_from_row).transpose()
}

/// Update the cached screening risk fields after a completed assessment
pub async fn update_screening_fields(
    pool: &SqlitePool,
    student_id: Uuid,
    dyslexia_risk: i64,
    screening_confidence: f64,
    assessed_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE students
        SET screening_status = 'completed',
            dyslexia_risk = ?,
            screening_confidence = ?,
            assessed_at = ?
        WHERE id = ?
        "#,
    )
    .bind(dyslexia_risk)
    .bind(screening_confidence)
    .bind(time::to_column(assessed_at))
    .bind(student_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

fn student_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Student> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse student id: {}", e)))?;

    let assessed_at: Option<String> = row.get("assessed_at");
    let created_at: String = row.get("created_at");

    Ok(Student {
        id,
        name: row.get("name"),
        age: row.get("age"),
        grade: row.get("grade"),
        screening_status: row.get("screening_status"),
        dyslexia_risk: row.get("dyslexia_risk"),
        screening_confidence: row.get("screening_confidence"),
        assessed_at: time::from_column_opt(assessed_at)?,
        created_at: time::from_column(&created_at)?,
    })
}
