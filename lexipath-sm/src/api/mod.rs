//! HTTP API handlers for lexipath-sm

pub mod assessments;
pub mod health;
pub mod media;

pub use assessments::assessment_routes;
pub use health::health_routes;
pub use media::media_routes;
