//! Service components of the Screening Manager

pub mod media_store;
pub mod scorer_client;
pub mod session_manager;

pub use media_store::MediaStore;
pub use scorer_client::{ReadingAnalysis, ScorerClient, ScorerResult, ScreeningRisk, SpeechAnalysis};
pub use session_manager::{
    AssessmentDetail, AssessmentSummary, CompletionResult, SessionManager, SessionView,
    SubmitResult,
};
