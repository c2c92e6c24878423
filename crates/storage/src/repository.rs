use async_trait::async_trait;
use scaled_core::model::{PracticeSettings, PracticeState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::records::{PracticeSettingsRecord, PracticeStateRecord};

/// Key holding the user's practice settings.
pub const SETTINGS_KEY: &str = "scale-practice-settings";
/// Key holding the rotation order and per-scale progress.
pub const PRACTICE_STATE_KEY: &str = "scale-practice-state";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Raw string key-value storage. Both persisted entries live side by side in one store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite an entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load settings, `None` when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed or invalid entries.
    async fn get_settings(&self) -> Result<Option<PracticeSettings>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &PracticeSettings) -> Result<(), StorageError>;
}

#[async_trait]
pub trait PracticeStateRepository: Send + Sync {
    /// Load the practice state, `None` when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed or inconsistent entries.
    async fn get_state(&self) -> Result<Option<PracticeState>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be stored.
    async fn save_state(&self, state: &PracticeState) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be removed.
    async fn clear_state(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> SettingsRepository for T {
    async fn get_settings(&self) -> Result<Option<PracticeSettings>, StorageError> {
        let Some(raw) = self.get(SETTINGS_KEY).await? else {
            return Ok(None);
        };
        let record: PracticeSettingsRecord = serde_json::from_str(&raw)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        record
            .into_settings()
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_settings(&self, settings: &PracticeSettings) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&PracticeSettingsRecord::from_settings(settings))
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.put(SETTINGS_KEY, &raw).await
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> PracticeStateRepository for T {
    async fn get_state(&self) -> Result<Option<PracticeState>, StorageError> {
        let Some(raw) = self.get(PRACTICE_STATE_KEY).await? else {
            return Ok(None);
        };
        let record: PracticeStateRecord = serde_json::from_str(&raw)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        record
            .into_state()
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_state(&self, state: &PracticeState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&PracticeStateRecord::from_state(state))
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.put(PRACTICE_STATE_KEY, &raw).await
    }

    async fn clear_state(&self) -> Result<(), StorageError> {
        self.remove(PRACTICE_STATE_KEY).await
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
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

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
    pub practice_state: Arc<dyn PracticeStateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryStore::new())
    }

    /// Wire both repositories to one key-value backend.
    #[must_use]
    pub fn from_store<S: KeyValueStore + Clone + 'static>(store: S) -> Self {
        let settings: Arc<dyn SettingsRepository> = Arc::new(store.clone());
        let practice_state: Arc<dyn PracticeStateRepository> = Arc::new(store);
        Self {
            settings,
            practice_state,
        }
    }
}
