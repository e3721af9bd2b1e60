mod progress;
mod service;

// Public API of the assessment subsystem.
pub use crate::error::AssessmentServiceError;
pub use progress::{AssessmentProgress, AssessmentSummary};
pub use service::AssessmentService;
