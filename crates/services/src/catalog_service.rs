use std::sync::Arc;

use storage::repository::{SettingsRecord, SettingsRepository};
use trainer_core::model::{
    AppSettings, CategoryName, CategorySet, LearningResource, ResourceCatalog, ResourceDraft,
    ResourceError, ResourceId, ResourceKind,
};

use crate::error::CatalogServiceError;

/// Settings document a fresh installation starts with.
///
/// # Errors
///
/// Returns `ResourceError::Parse` if the bundled catalog is malformed.
pub fn default_record() -> Result<SettingsRecord, ResourceError> {
    let categories = CategorySet::with_defaults();
    let learning_resources = bundled_catalog_for(&categories)?;
    Ok(SettingsRecord {
        app: AppSettings::default(),
        categories,
        learning_resources,
    })
}

/// Bundled catalog with an empty shelf set for every active category.
fn bundled_catalog_for(categories: &CategorySet) -> Result<ResourceCatalog, ResourceError> {
    let mut catalog = ResourceCatalog::bundled()?;
    for category in categories.iter() {
        catalog.ensure_category(category.as_str());
    }
    Ok(catalog)
}

/// Categories and the Learning Hub resource catalog.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn SettingsRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load the settings document, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` on storage failures.
    pub async fn load(&self) -> Result<SettingsRecord, CatalogServiceError> {
        match self.repo.load_settings().await? {
            Some(record) => Ok(record),
            None => Ok(default_record()?),
        }
    }

    /// Persist the default document unless one exists (or `force` is set).
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` on storage failures.
    pub async fn seed(&self, force: bool) -> Result<bool, CatalogServiceError> {
        if !force && self.repo.load_settings().await?.is_some() {
            return Ok(false);
        }
        self.repo.save_settings(&default_record()?).await?;
        tracing::info!(force, "seeded categories and learning resources");
        Ok(true)
    }

    /// Active categories.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` on storage failures.
    pub async fn categories(&self) -> Result<CategorySet, CatalogServiceError> {
        Ok(self.load().await?.categories)
    }

    /// Add a category and give it an empty shelf for every resource kind.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Category` for blank or duplicate names.
    pub async fn add_category(&self, name: &str) -> Result<CategoryName, CatalogServiceError> {
        let mut record = self.load().await?;
        let name = record.categories.add(name)?;
        record.learning_resources.ensure_category(name.as_str());
        self.repo.save_settings(&record).await?;
        tracing::info!(category = %name, "category added");
        Ok(name)
    }

    /// Remove a user-added category together with its resources.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Category` for default or unknown names.
    pub async fn remove_category(&self, name: &str) -> Result<CategoryName, CatalogServiceError> {
        let mut record = self.load().await?;
        let name = record.categories.remove(name)?;
        record.learning_resources.remove_category(name.as_str());
        self.repo.save_settings(&record).await?;
        tracing::info!(category = %name, "category removed");
        Ok(name)
    }

    /// Resources on one shelf of the hub.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` on storage failures.
    pub async fn resources(
        &self,
        category: &str,
        kind: ResourceKind,
    ) -> Result<Vec<LearningResource>, CatalogServiceError> {
        let record = self.load().await?;
        Ok(record.learning_resources.resources(category, kind).to_vec())
    }

    /// Resources on one shelf of an active category matching `term`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCategory` for inactive categories.
    pub async fn search_resources(
        &self,
        category: &str,
        kind: ResourceKind,
        term: &str,
    ) -> Result<Vec<LearningResource>, CatalogServiceError> {
        let record = self.load().await?;
        if !record.categories.contains(category) {
            return Err(CatalogServiceError::UnknownCategory(category.to_owned()));
        }
        Ok(record
            .learning_resources
            .search(category, kind, term)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Put the learning resources back to the bundled set.
    ///
    /// Categories and app settings are kept; user-added categories get empty
    /// shelves.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` on storage failures.
    pub async fn reset_resources(&self) -> Result<(), CatalogServiceError> {
        let mut record = self.load().await?;
        record.learning_resources = bundled_catalog_for(&record.categories)?;
        self.repo.save_settings(&record).await?;
        tracing::info!("learning resources reset");
        Ok(())
    }

    /// Add a resource to a shelf of an active category.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCategory` for inactive categories and
    /// `CatalogServiceError::Resource` for invalid drafts.
    pub async fn add_resource(
        &self,
        category: &str,
        kind: ResourceKind,
        draft: ResourceDraft,
    ) -> Result<ResourceId, CatalogServiceError> {
        let mut record = self.load().await?;
        if !record.categories.contains(category) {
            return Err(CatalogServiceError::UnknownCategory(category.to_owned()));
        }
        let id = record.learning_resources.add(category, kind, draft)?;
        self.repo.save_settings(&record).await?;
        tracing::info!(category, kind = kind.key(), id = %id, "resource added");
        Ok(id)
    }

    /// Remove the resource at `index` on a shelf.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Resource` if nothing is at that index.
    pub async fn remove_resource(
        &self,
        category: &str,
        kind: ResourceKind,
        index: usize,
    ) -> Result<LearningResource, CatalogServiceError> {
        let mut record = self.load().await?;
        let removed = record.learning_resources.remove(category, kind, index)?;
        self.repo.save_settings(&record).await?;
        tracing::info!(category, kind = kind.key(), id = %removed.id, "resource removed");
        Ok(removed)
    }
}
