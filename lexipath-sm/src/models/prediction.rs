//! ML prediction records
//!
//! Append-only: predictions are inserted when scoring runs and are never
//! updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Kind of scored inference tied to an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    /// Per-game: reading-pattern analysis of game 1
    DyslexiaRiskEyeTracking,
    /// Per-game: speech-fluency analysis of game 2
    DyslexiaRiskSpeech,
    /// Final aggregate produced at completion
    ScreeningOverall,
}

impl PredictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DyslexiaRiskEyeTracking => "dyslexia_risk_eye_tracking",
            Self::DyslexiaRiskSpeech => "dyslexia_risk_speech",
            Self::ScreeningOverall => "screening_overall",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dyslexia_risk_eye_tracking" => Some(Self::DyslexiaRiskEyeTracking),
            "dyslexia_risk_speech" => Some(Self::DyslexiaRiskSpeech),
            "screening_overall" => Some(Self::ScreeningOverall),
            _ => None,
        }
    }
}

/// A scored inference for an assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlPrediction {
    pub id: Uuid,
    pub assessment_id: Uuid,
    /// Set only on `screening_overall` predictions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Uuid>,
    pub prediction_type: PredictionType,
    /// Risk estimate in 0..=1
    pub risk_score: f64,
    /// Confidence in 0..=1
    pub confidence_score: f64,
    /// Opaque payload returned by the scorer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl MlPrediction {
    pub fn new(
        assessment_id: Uuid,
        student_id: Option<Uuid>,
        prediction_type: PredictionType,
        risk_score: f64,
        confidence_score: f64,
        details: Option<Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessment_id,
            student_id,
            prediction_type,
            risk_score,
            confidence_score,
            details,
            created_at: lexipath_common::time::now(),
        }
    }
}
