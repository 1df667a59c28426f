//! External ML scorer client
//!
//! Thin HTTP interface to the scoring service. Each operation is a single
//! outbound call with a bounded timeout and no retry, and none of them
//! ever surfaces an error to the caller: network failure, timeout, or a
//! non-2xx response all produce [`ScorerResult::Degraded`] carrying a safe
//! default, so the screening flow is never blocked by scorer outages.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{GazePoint, ScreenDimensions, TextBoundingBox};

/// Flag attached to a degraded reading analysis
pub const ANALYSIS_FAILED_FLAG: &str = "analysis_failed";

/// Flag attached to a degraded screening prediction
pub const CALCULATION_FAILED_FLAG: &str = "calculation_failed";

/// Scorer transport/protocol errors (internal; converted to `Degraded`)
#[derive(Debug, Error)]
enum ScorerError {
    /// Network communication error or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Scorer returned a non-2xx response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the scorer response JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Outcome of a scorer call
///
/// Both arms carry a usable value, so callers never need error handling
/// to keep the flow moving; `Degraded` additionally records why the real
/// call failed.
#[derive(Debug, Clone)]
pub enum ScorerResult<T> {
    /// The external service produced this result
    Scored(T),
    /// The call failed; `value` is the safe default
    Degraded { value: T, reason: String },
}

impl<T> ScorerResult<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Scored(value) => value,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Scored(value) => value,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Scored(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Reading-pattern analysis of game 1 gaze data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingAnalysis {
    #[serde(default)]
    pub fixation_count: i64,
    #[serde(default)]
    pub saccade_count: i64,
    #[serde(default)]
    pub regression_count: i64,
    #[serde(default)]
    pub average_fixation_duration: f64,
    #[serde(default)]
    pub reading_speed_score: f64,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    #[serde(default)]
    pub dyslexia_risk_score: f64,
}

impl ReadingAnalysis {
    /// Zeroed fallback with the failure flag set
    fn degraded_default() -> Self {
        Self {
            fixation_count: 0,
            saccade_count: 0,
            regression_count: 0,
            average_fixation_duration: 0.0,
            reading_speed_score: 0.0,
            risk_flags: vec![ANALYSIS_FAILED_FLAG.to_string()],
            dyslexia_risk_score: 0.0,
        }
    }
}

/// Speech-fluency analysis of game 2 audio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechAnalysis {
    #[serde(default)]
    pub fluency_score: f64,
    #[serde(default)]
    pub words_per_minute: f64,
    #[serde(default)]
    pub pause_count: i64,
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub confidence: f64,
}

impl SpeechAnalysis {
    /// Neutral-fluency fallback: risk derived as 1 − fluency stays midpoint
    fn degraded_default() -> Self {
        Self {
            fluency_score: 0.5,
            words_per_minute: 0.0,
            pause_count: 0,
            transcription: String::new(),
            confidence: 0.0,
        }
    }
}

/// Final aggregate screening risk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningRisk {
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub flagged_areas: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

impl ScreeningRisk {
    /// Low-confidence fallback risk when aggregation cannot be scored
    fn degraded_default(reason: &str) -> Self {
        Self {
            risk_score: 0.1,
            risk_level: "low".to_string(),
            flagged_areas: vec![CALCULATION_FAILED_FLAG.to_string(), reason.to_string()],
            confidence: 0.5,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReadingRequest<'a> {
    gaze_points: &'a [GazePoint],
    screen_width: f64,
    screen_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_bbox: Option<TextBoundingBox>,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    audio_url: &'a str,
}

#[derive(Debug, Serialize)]
struct ScreeningRequest<'a> {
    age: i64,
    gender: &'a str,
    games_data: &'a Value,
}

/// ML scorer API client
#[derive(Debug, Clone)]
pub struct ScorerClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ScorerClient {
    /// Create a new scorer client with a fixed per-call timeout
    pub fn new(base_url: &str, timeout: Duration) -> lexipath_common::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                lexipath_common::Error::Internal(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Analyze game 1 gaze data for reading patterns
    pub async fn analyze_reading_patterns(
        &self,
        gaze_points: &[GazePoint],
        screen: ScreenDimensions,
        text_bbox: Option<TextBoundingBox>,
    ) -> ScorerResult<ReadingAnalysis> {
        let request = ReadingRequest {
            gaze_points,
            screen_width: screen.width,
            screen_height: screen.height,
            text_bbox,
        };

        match self.post_json("/predict/reading-patterns", &request).await {
            Ok(analysis) => ScorerResult::Scored(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "Reading pattern analysis degraded to default");
                ScorerResult::Degraded {
                    value: ReadingAnalysis::degraded_default(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Analyze game 2 audio for speech fluency
    pub async fn analyze_speech(&self, audio_url: &str) -> ScorerResult<SpeechAnalysis> {
        let request = SpeechRequest { audio_url };

        match self.post_json("/predict/speech-fluency", &request).await {
            Ok(analysis) => ScorerResult::Scored(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "Speech analysis degraded to default");
                ScorerResult::Degraded {
                    value: SpeechAnalysis::degraded_default(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Aggregate all game payloads into a final screening risk
    pub async fn predict_screening_risk(
        &self,
        age: i64,
        gender: &str,
        games_data: &Value,
    ) -> ScorerResult<ScreeningRisk> {
        let request = ScreeningRequest {
            age,
            gender,
            games_data,
        };

        match self.post_json("/predict/screening", &request).await {
            Ok(risk) => ScorerResult::Scored(risk),
            Err(e) => {
                tracing::warn!(error = %e, "Screening prediction degraded to default");
                ScorerResult::Degraded {
                    value: ScreeningRisk::degraded_default(&e.to_string()),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Probe the scorer's health endpoint (startup diagnostics only)
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, ScorerError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Calling ML scorer");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ScorerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScorerError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ScorerError::Parse(e.to_string()))
    }
}
