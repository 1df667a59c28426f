//! Assessment aggregate: one screening attempt and its per-game records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::GameType;
use crate::models::submission::EyeTrackingData;

/// Assessment lifecycle status
///
/// An assessment starts `in_progress` and moves to `completed` exactly
/// once; there is no other transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// One screening attempt for one student
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub student_id: Uuid,
    /// Locale code; unknown codes fall back to the default at catalog lookup
    pub language: String,
    pub status: AssessmentStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Assessment {
    /// Create a new in-progress assessment starting now
    pub fn new(student_id: Uuid, language: String) -> Self {
        let now = lexipath_common::time::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            language,
            status: AssessmentStatus::InProgress,
            started_at: now,
            completed_at: None,
            duration_seconds: None,
            created_at: now,
        }
    }
}

/// One completed game within an assessment
///
/// Keyed by (assessment_id, game_number); a resubmission overwrites the
/// payload columns but keeps the row identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentGame {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub game_number: u8,
    pub game_type: GameType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_tracking_data: Option<EyeTrackingData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handwriting_strokes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_data: Option<Value>,
    pub completed_at: DateTime<Utc>,
}
