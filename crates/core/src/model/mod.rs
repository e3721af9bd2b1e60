mod app_settings;
pub mod assessment;
mod category;
mod ids;
mod question;
pub mod recommendation;
pub mod resource;
mod user;

pub use app_settings::{AppSettings, AppSettingsDraft, AppSettingsError};
pub use assessment::{
    AssessmentError, AssessmentRun, CheckOutcome, Mistake, PrimaryAction, Step,
    rounded_percentage,
};
pub use category::{CategoryError, CategoryName, CategorySet, DEFAULT_CATEGORIES};
pub use ids::{ParseIdError, ResourceId, UserId};
pub use question::{Question, QuestionBank, QuestionDraft, QuestionError};
pub use recommendation::{PerformanceBand, Recommendation, summarize_mistakes};
pub use resource::{LearningResource, ResourceCatalog, ResourceDraft, ResourceError, ResourceKind};
pub use user::{DEFAULT_ADMIN_USERNAME, Role, User, UserDirectory, UserDraft, UserError, UserUpdate};
