#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, KeyValueStore, SettingsRecord, SettingsRepository, Storage, StorageError,
    UserRepository, keys,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
