use std::sync::Arc;

use storage::repository::Storage;
use trainer_core::model::{CategorySet, QuestionBank};

use crate::Clock;
use crate::assessment::AssessmentService;
use crate::catalog_service::CatalogService;
use crate::error::{AppServicesError, AssessmentServiceError};
use crate::settings_service::SettingsService;
use crate::user_service::UserService;

/// Assembles app-facing services over one storage backend and the bundled
/// question bank.
#[derive(Clone)]
pub struct AppServices {
    bank: Arc<QuestionBank>,
    catalog: Arc<CatalogService>,
    settings: Arc<SettingsService>,
    users: Arc<UserService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the bundled
    /// question bank fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, clock)
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the bundled question bank fails to load.
    pub fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if the bundled question bank fails to load
    /// or names a category outside the defaults.
    pub fn from_storage(storage: &Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let bank = QuestionBank::bundled()?;
        bank.validate_categories(&CategorySet::with_defaults())?;

        Ok(Self {
            bank: Arc::new(bank),
            catalog: Arc::new(CatalogService::new(Arc::clone(&storage.settings))),
            settings: Arc::new(SettingsService::new(Arc::clone(&storage.settings))),
            users: Arc::new(UserService::new(clock, Arc::clone(&storage.users))),
        })
    }

    /// Write the default settings document and admin account.
    ///
    /// Existing data is kept unless `force` is set.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` on storage failures.
    pub async fn seed(&self, force: bool) -> Result<(), AppServicesError> {
        self.catalog.seed(force).await?;
        self.users.seed(force).await?;
        Ok(())
    }

    /// Start a fresh, randomly ordered assessment run.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError` if the bank is empty.
    pub fn start_assessment(&self) -> Result<AssessmentService, AssessmentServiceError> {
        AssessmentService::new(Arc::clone(&self.bank))
    }

    #[must_use]
    pub fn bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.bank)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }
}
