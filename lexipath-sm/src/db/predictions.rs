//! ML prediction row operations (insert-only)

use lexipath_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{MlPrediction, PredictionType};

/// Append a prediction row
pub async fn insert_prediction(pool: &SqlitePool, prediction: &MlPrediction) -> Result<()> {
    let details = prediction
        .details
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO ml_predictions (
            id, assessment_id, student_id, prediction_type,
            risk_score, confidence_score, details, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(prediction.id.to_string())
    .bind(prediction.assessment_id.to_string())
    .bind(prediction.student_id.map(|id| id.to_string()))
    .bind(prediction.prediction_type.as_str())
    .bind(prediction.risk_score)
    .bind(prediction.confidence_score)
    .bind(&details)
    .bind(time::to_column(prediction.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// All predictions for an assessment, oldest first
pub async fn list_predictions(
    pool: &SqlitePool,
    assessment_id: Uuid,
) -> Result<Vec<MlPrediction>> {
    let rows = sqlx::query(
        r#"
        SELECT id, assessment_id, student_id, prediction_type,
               risk_score, confidence_score, details, created_at
        FROM ml_predictions
        WHERE assessment_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(assessment_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(prediction_from_row).collect()
}

fn prediction_from_row(row: sqlx::sqlite::SqliteRow) -> Result<MlPrediction> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse prediction id: {}", e)))?;

    let assessment_id: String = row.get("assessment_id");
    let assessment_id = Uuid::parse_str(&assessment_id)
        .map_err(|e| Error::Internal(format!("Failed to parse assessment_id: {}", e)))?;

    let student_id: Option<String> = row.get("student_id");
    let student_id = student_id
        .map(|raw| {
            Uuid::parse_str(&raw)
                .map_err(|e| Error::Internal(format!("Failed to parse student_id: {}", e)))
        })
        .transpose()?;

    let prediction_type: String = row.get("prediction_type");
    let prediction_type = PredictionType::parse(&prediction_type)
        .ok_or_else(|| Error::Internal(format!("Unknown prediction type: {}", prediction_type)))?;

    let details: Option<String> = row.get("details");
    let details = details.as_deref().map(serde_json::from_str).transpose()?;

    let created_at: String = row.get("created_at");

    Ok(MlPrediction {
        id,
        assessment_id,
        student_id,
        prediction_type,
        risk_score: row.get("risk_score"),
        confidence_score: row.get("confidence_score"),
        details,
        created_at: time::from_column(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_list() {
        let pool = crate::db::test_pool().await;
        let assessment_id = Uuid::new_v4();

        let per_game = MlPrediction::new(
            assessment_id,
            None,
            PredictionType::DyslexiaRiskEyeTracking,
            0.3,
            0.85,
            Some(json!({"fixation_count": 12})),
        );
        insert_prediction(&pool, &per_game).await.unwrap();

        let overall = MlPrediction::new(
            assessment_id,
            Some(Uuid::new_v4()),
            PredictionType::ScreeningOverall,
            0.55,
            0.9,
            None,
        );
        insert_prediction(&pool, &overall).await.unwrap();

        let predictions = list_predictions(&pool, assessment_id).await.unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(
            predictions[0].prediction_type,
            PredictionType::DyslexiaRiskEyeTracking
        );
        assert_eq!(predictions[0].details, Some(json!({"fixation_count": 12})));
        assert_eq!(predictions[1].prediction_type, PredictionType::ScreeningOverall);
        assert!(predictions[1].student_id.is_some());
    }

    #[tokio::test]
    async fn test_other_assessments_not_listed() {
        let pool = crate::db::test_pool().await;
        let prediction = MlPrediction::new(
            Uuid::new_v4(),
            None,
            PredictionType::DyslexiaRiskSpeech,
            0.5,
            0.8,
            None,
        );
        insert_prediction(&pool, &prediction).await.unwrap();

        assert!(list_predictions(&pool, Uuid::new_v4()).await.unwrap().is_empty());
    }
}
