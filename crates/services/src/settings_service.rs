use std::sync::Arc;

use storage::repository::SettingsRepository;
use trainer_core::model::{AppSettings, AppSettingsDraft};

use crate::catalog_service::default_record;
use crate::error::SettingsServiceError;

/// Welcome message and learning channel.
#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<AppSettings, SettingsServiceError> {
        let record = self.repo.load_settings().await?;
        Ok(record.map(|r| r.app).unwrap_or_default())
    }

    /// Validate and persist new settings, leaving categories and resources as they are.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation fails or persistence fails.
    pub async fn save(&self, draft: AppSettingsDraft) -> Result<AppSettings, SettingsServiceError> {
        let settings = draft.validate()?;
        let mut record = match self.repo.load_settings().await? {
            Some(record) => record,
            None => default_record()?,
        };
        record.app = settings.clone();
        self.repo.save_settings(&record).await?;
        tracing::info!("app settings saved");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use trainer_core::model::AppSettingsError;

    #[tokio::test]
    async fn missing_settings_load_as_defaults() {
        let svc = SettingsService::new(Arc::new(InMemoryRepository::new()));
        assert_eq!(svc.load().await.unwrap(), AppSettings::default());
    }

    #[tokio::test]
    async fn save_keeps_the_catalog() {
        let repo = InMemoryRepository::new();
        let svc = SettingsService::new(Arc::new(repo.clone()));

        let saved = svc
            .save(AppSettingsDraft {
                welcome_message: Some("Hello PMO".into()),
                channel_url: Some("https://www.youtube.com/@pmo".into()),
            })
            .await
            .unwrap();
        assert_eq!(saved.welcome_message(), "Hello PMO");
        assert_eq!(svc.load().await.unwrap(), saved);

        let record = repo.load_settings().await.unwrap().unwrap();
        assert!(!record.categories.is_empty());
    }

    #[tokio::test]
    async fn invalid_channel_is_rejected_without_writing() {
        let repo = InMemoryRepository::new();
        let svc = SettingsService::new(Arc::new(repo.clone()));
        let err = svc
            .save(AppSettingsDraft {
                welcome_message: None,
                channel_url: Some("not a url".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsServiceError::Settings(AppSettingsError::InvalidChannelUrl)
        ));
        assert!(repo.load_settings().await.unwrap().is_none());
    }
}
