//! Per-game submission payloads
//!
//! Every field is optional; each game supplies only its own slice
//! (gaze points for game 1, an audio reference for game 2, stroke data
//! for game 3, structured responses for games 4 and 5).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::scorer_client::ReadingAnalysis;

/// One raw gaze sample from the webcam tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazePoint {
    pub x: f64,
    pub y: f64,
    /// Milliseconds relative to game start
    pub timestamp: f64,
}

/// Client screen size at capture time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScreenDimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenDimensions {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Bounding box of the displayed reading passage, in screen pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextBoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Raw gaze capture plus (after scoring) the derived reading analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EyeTrackingData {
    #[serde(default)]
    pub raw_points: Vec<GazePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ReadingAnalysis>,
}

/// Request body for a per-game submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSubmission {
    #[serde(default)]
    pub eye_tracking_data: Option<EyeTrackingData>,
    #[serde(default)]
    pub speech_audio_url: Option<String>,
    #[serde(default)]
    pub speech_transcription: Option<String>,
    #[serde(default)]
    pub handwriting_strokes: Option<Value>,
    #[serde(default)]
    pub response_data: Option<Value>,
    #[serde(default)]
    pub screen_dimensions: Option<ScreenDimensions>,
    #[serde(default)]
    pub text_bounding_box: Option<TextBoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_submission_parses() {
        let submission: GameSubmission = serde_json::from_str("{}").unwrap();
        assert!(submission.eye_tracking_data.is_none());
        assert!(submission.response_data.is_none());
    }

    #[test]
    fn test_eye_tracking_submission_parses() {
        let submission: GameSubmission = serde_json::from_str(
            r#"{
                "eye_tracking_data": {"raw_points": [{"x": 1.0, "y": 2.0, "timestamp": 3.0}]},
                "screen_dimensions": {"width": 1280.0, "height": 720.0}
            }"#,
        )
        .unwrap();

        let eye_tracking = submission.eye_tracking_data.unwrap();
        assert_eq!(eye_tracking.raw_points.len(), 1);
        assert!(eye_tracking.analysis.is_none());
        assert_eq!(submission.screen_dimensions.unwrap().width, 1280.0);
    }
}
