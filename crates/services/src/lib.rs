#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod metronome;
pub mod practice;
pub mod settings_service;
pub mod timers;

pub use scaled_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, AudioError, PracticeServiceError, SettingsServiceError};
pub use metronome::{ClickOutput, Metronome, SilentOutput};
pub use practice::{
    PracticeService, PracticeSession, SessionEvent, SettingsChange, SnapshotSender, SnapshotWriter,
};
pub use settings_service::SettingsService;
