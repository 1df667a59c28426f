//! Domain models for the Screening Manager

pub mod assessment;
pub mod prediction;
pub mod student;
pub mod submission;

pub use assessment::{Assessment, AssessmentGame, AssessmentStatus};
pub use prediction::{MlPrediction, PredictionType};
pub use student::Student;
pub use submission::{EyeTrackingData, GameSubmission, GazePoint, ScreenDimensions, TextBoundingBox};
