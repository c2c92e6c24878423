use thiserror::Error;

use crate::model::{PracticeStateError, SettingsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    PracticeState(#[from] PracticeStateError),
}
