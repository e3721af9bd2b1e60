#![forbid(unsafe_code)]

pub mod app_services;
pub mod assessment;
pub mod catalog_service;
pub mod error;
pub mod settings_service;
pub mod user_service;

pub use trainer_core::Clock;

pub use app_services::AppServices;
pub use assessment::{AssessmentProgress, AssessmentService, AssessmentSummary};
pub use catalog_service::CatalogService;
pub use error::{
    AppServicesError, AssessmentServiceError, CatalogServiceError, SettingsServiceError,
    UserServiceError,
};
pub use settings_service::SettingsService;
pub use user_service::UserService;
