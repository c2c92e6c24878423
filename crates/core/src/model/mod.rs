mod practice_state;
mod progress;
mod settings;

pub use practice_state::{AcceptOutcome, PracticeState, PracticeStateError, scales_changed};
pub use progress::ScaleProgress;
pub use settings::{
    DEFAULT_REPETITIONS, DEFAULT_SCALES, MAX_BPM, MAX_REPETITIONS, MAX_VOLUME, MIN_BPM,
    MIN_REPETITIONS, MetronomeSettings, PracticeSettings, SettingsError, Tone,
};
