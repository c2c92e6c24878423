use std::sync::Arc;

use scaled_core::model::PracticeSettings;
use storage::repository::{SettingsRepository, StorageError};
use tracing::warn;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings, or defaults if missing or malformed.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` when the backend cannot be read.
    pub async fn load(&self) -> Result<PracticeSettings, SettingsServiceError> {
        match self.repo.get_settings().await {
            Ok(settings) => Ok(settings.unwrap_or_default()),
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "stored settings are malformed; using defaults");
                Ok(PracticeSettings::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` if persistence fails.
    pub async fn save(&self, settings: &PracticeSettings) -> Result<(), SettingsServiceError> {
        self.repo.save_settings(settings).await?;
        Ok(())
    }
}
