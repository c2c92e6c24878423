mod practice;
mod settings;
mod state;

#[cfg(test)]
mod view_smoke;

pub use practice::{
    CompletionPanel, MetronomeIndicator, PracticeScreen, PracticeView, ProgressTracker, ScaleCard,
};
pub use settings::SettingsView;
pub use state::{
    CelebrationSlot, PersistQueue, SessionSlot, ViewError, ViewState, apply_effects, snapshot,
};
