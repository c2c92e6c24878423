use std::sync::Arc;

use scaled_core::Clock;
use scaled_core::model::{PracticeSettings, PracticeState};
use storage::repository::{PracticeStateRepository, StorageError};
use tracing::{debug, warn};

use crate::error::PracticeServiceError;
use crate::settings_service::SettingsService;

use super::session::PracticeSession;

/// Loads and persists practice sessions.
#[derive(Clone)]
pub struct PracticeService {
    clock: Clock,
    settings: Arc<SettingsService>,
    states: Arc<dyn PracticeStateRepository>,
}

impl PracticeService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: Arc<SettingsService>,
        states: Arc<dyn PracticeStateRepository>,
    ) -> Self {
        Self {
            clock,
            settings,
            states,
        }
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    /// Load the stored state and align it with `settings`.
    ///
    /// Missing or malformed entries start a fresh run; a state tracking other
    /// scales is rebuilt over the configured ones.
    ///
    /// # Errors
    ///
    /// Returns `PracticeServiceError::Storage` when the backend cannot be read.
    pub async fn load_state(
        &self,
        settings: &PracticeSettings,
    ) -> Result<PracticeState, PracticeServiceError> {
        let mut rng = rand::rng();
        let stored = match self.states.get_state().await {
            Ok(stored) => stored,
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "stored practice state is malformed; starting fresh");
                None
            }
            Err(err) => return Err(err.into()),
        };

        let state = match stored {
            Some(state) if state.tracks_scales(settings.scales()) => state,
            Some(state) => {
                debug!("stored practice state tracks other scales; rebuilding");
                state.rebuild_for(settings.scales(), &mut rng)
            }
            None => PracticeState::initialize(settings, &mut rng),
        };
        Ok(state)
    }

    /// Load settings and state and wrap them in a session.
    ///
    /// # Errors
    ///
    /// Returns `PracticeServiceError` when storage cannot be read or written.
    pub async fn open_session(&self) -> Result<PracticeSession, PracticeServiceError> {
        let settings = self.settings.load().await?;
        let state = self.load_state(&settings).await?;
        self.states.save_state(&state).await?;
        debug!(
            scales = settings.scales().len(),
            completed = state.completed_count(),
            "practice session opened"
        );
        Ok(PracticeSession::new(settings, state, self.clock))
    }

    /// # Errors
    ///
    /// Returns `PracticeServiceError::Storage` if persistence fails.
    pub async fn save_state(&self, state: &PracticeState) -> Result<(), PracticeServiceError> {
        self.states.save_state(state).await?;
        Ok(())
    }

    /// Persist both the settings and the state of `session`.
    ///
    /// # Errors
    ///
    /// Returns `PracticeServiceError` if either write fails.
    pub async fn save_session(&self, session: &PracticeSession) -> Result<(), PracticeServiceError> {
        self.settings.save(session.settings()).await?;
        self.states.save_state(session.state()).await?;
        Ok(())
    }

    /// Discard stored progress and persist a freshly shuffled state.
    ///
    /// # Errors
    ///
    /// Returns `PracticeServiceError` when storage cannot be read or written.
    pub async fn reset_progress(&self) -> Result<PracticeState, PracticeServiceError> {
        let settings = self.settings.load().await?;
        let state = PracticeState::reset(&settings, &mut rand::rng());
        self.states.save_state(&state).await?;
        Ok(state)
    }
}
