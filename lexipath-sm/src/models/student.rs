//! Student reference and cached screening summary
//!
//! Students are owned by the wider platform; the Screening Manager reads
//! identity/age for scoring and writes back the cached risk fields after
//! completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub age: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    /// "pending" until a screening completes
    pub screening_status: String,
    /// Cached percentage 0..=100 from the latest overall prediction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dyslexia_risk: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screening_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// New unscreened student
    pub fn new(name: String, age: i64, grade: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            age,
            grade,
            screening_status: "pending".to_string(),
            dyslexia_risk: None,
            screening_confidence: None,
            assessed_at: None,
            created_at: lexipath_common::time::now(),
        }
    }
}
