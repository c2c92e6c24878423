//! Persisted JSON shapes for settings and practice state.
//!
//! Field names are camelCase so existing stored entries keep loading. Records
//! are validated on the way back into the domain types.

use serde::{Deserialize, Serialize};

use scaled_core::model::{
    MetronomeSettings, PracticeSettings, PracticeState, PracticeStateError, ScaleProgress,
    SettingsError, Tone,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetronomeRecord {
    pub enabled: bool,
    pub bpm: u32,
    pub volume: u32,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSettingsRecord {
    pub scales: Vec<String>,
    pub repetitions_required: u32,
    pub metronome: MetronomeRecord,
}

impl PracticeSettingsRecord {
    #[must_use]
    pub fn from_settings(settings: &PracticeSettings) -> Self {
        let metronome = settings.metronome();
        Self {
            scales: settings.scales().to_vec(),
            repetitions_required: settings.repetitions_required(),
            metronome: MetronomeRecord {
                enabled: metronome.enabled(),
                bpm: metronome.bpm(),
                volume: metronome.volume(),
                tone: metronome.tone(),
            },
        }
    }

    /// # Errors
    ///
    /// Returns `SettingsError` if the stored values violate settings invariants.
    pub fn into_settings(self) -> Result<PracticeSettings, SettingsError> {
        let metronome = MetronomeSettings::from_persisted(
            self.metronome.enabled,
            self.metronome.bpm,
            self.metronome.volume,
            self.metronome.tone,
        )?;
        PracticeSettings::from_persisted(self.scales, self.repetitions_required, metronome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleProgressRecord {
    pub name: String,
    pub success_count: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStateRecord {
    pub current_scale_index: usize,
    pub scale_progress: Vec<ScaleProgressRecord>,
    pub practice_order: Vec<usize>,
}

impl PracticeStateRecord {
    #[must_use]
    pub fn from_state(state: &PracticeState) -> Self {
        Self {
            current_scale_index: state.current_scale_index(),
            scale_progress: state
                .scale_progress()
                .iter()
                .map(|entry| ScaleProgressRecord {
                    name: entry.name().to_owned(),
                    success_count: entry.success_count(),
                    completed: entry.completed(),
                })
                .collect(),
            practice_order: state.practice_order().to_vec(),
        }
    }

    /// # Errors
    ///
    /// Returns `PracticeStateError` if the order, index or names are inconsistent.
    pub fn into_state(self) -> Result<PracticeState, PracticeStateError> {
        let progress = self
            .scale_progress
            .into_iter()
            .map(|entry| ScaleProgress::from_persisted(entry.name, entry.success_count, entry.completed))
            .collect();
        PracticeState::from_persisted(self.current_scale_index, progress, self.practice_order)
    }
}
