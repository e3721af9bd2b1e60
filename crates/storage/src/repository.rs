use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use trainer_core::model::{AppSettings, CategorySet, ResourceCatalog, UserDirectory, UserId};

/// Keys under which documents are stored.
pub mod keys {
    pub const SETTINGS: &str = "pmoSettings";
    pub const USERS: &str = "pmoUsers";
    pub const CURRENT_USER: &str = "pmoCurrentUser";
}

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// String-keyed store of JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and deserialize a JSON document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the stored value is not valid for `T`.
pub async fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and store a JSON document.
///
/// # Errors
///
/// Returns `StorageError` if serialization or the write fails.
pub async fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + Sync + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

/// Persisted shape of the settings document.
///
/// Holds the app settings together with the category list and the resource
/// catalog, since categories and their shelves change together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    #[serde(flatten)]
    pub app: AppSettings,
    #[serde(default)]
    pub categories: CategorySet,
    #[serde(default)]
    pub learning_resources: ResourceCatalog,
}

/// Repository contract for the settings document.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load the settings document, `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn load_settings(&self) -> Result<Option<SettingsRecord>, StorageError>;

    /// Persist the settings document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be stored.
    async fn save_settings(&self, record: &SettingsRecord) -> Result<(), StorageError>;
}

/// Repository contract for accounts and the logged-in user.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Load all users, `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn load_users(&self) -> Result<Option<UserDirectory>, StorageError>;

    /// Persist all users.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be stored.
    async fn save_users(&self, users: &UserDirectory) -> Result<(), StorageError>;

    /// Id of the logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn current_user(&self) -> Result<Option<UserId>, StorageError>;

    /// Record (or clear, with `None`) the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn set_current_user(&self, id: Option<UserId>) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> SettingsRepository for S {
    async fn load_settings(&self) -> Result<Option<SettingsRecord>, StorageError> {
        load_json(self, keys::SETTINGS).await
    }

    async fn save_settings(&self, record: &SettingsRecord) -> Result<(), StorageError> {
        save_json(self, keys::SETTINGS, record).await
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> UserRepository for S {
    async fn load_users(&self) -> Result<Option<UserDirectory>, StorageError> {
        load_json(self, keys::USERS).await
    }

    async fn save_users(&self, users: &UserDirectory) -> Result<(), StorageError> {
        save_json(self, keys::USERS, users).await
    }

    async fn current_user(&self) -> Result<Option<UserId>, StorageError> {
        load_json(self, keys::CURRENT_USER).await
    }

    async fn set_current_user(&self, id: Option<UserId>) -> Result<(), StorageError> {
        match id {
            Some(id) => save_json(self, keys::CURRENT_USER, &id).await,
            None => self.remove(keys::CURRENT_USER).await,
        }
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    /// Wire every repository to the same backing store.
    #[must_use]
    pub fn from_store<S>(store: S) -> Self
    where
        S: KeyValueStore + Clone + 'static,
    {
        let settings: Arc<dyn SettingsRepository> = Arc::new(store.clone());
        let users: Arc<dyn UserRepository> = Arc::new(store);
        Self { settings, users }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryRepository::new())
    }
}
