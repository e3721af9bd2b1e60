//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use trainer_core::model::{
    AppSettingsError, AssessmentError, CategoryError, QuestionError, ResourceError, UserError,
};

/// Errors emitted by `AssessmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}

impl AssessmentServiceError {
    /// Whether the error is a user-facing validation message that leaves the
    /// run usable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AssessmentServiceError::Assessment(err) if err.is_recoverable())
    }
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] AppSettingsError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("no user is logged in")]
    NotLoggedIn,
    #[error("admin access required")]
    Forbidden,
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),
    #[error(transparent)]
    Users(#[from] UserServiceError),
}
