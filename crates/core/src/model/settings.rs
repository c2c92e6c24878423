use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scales offered on first launch, in presentation order.
pub const DEFAULT_SCALES: [&str; 13] = [
    "C Major", "G Major", "D Major", "A Major", "E Major", "B Major", "F Major", "Bb Major",
    "Eb Major", "Ab Major", "A Minor", "E Minor", "D Minor",
];

pub const MIN_REPETITIONS: u32 = 1;
pub const MAX_REPETITIONS: u32 = 10;
pub const DEFAULT_REPETITIONS: u32 = 3;

pub const MIN_BPM: u32 = 40;
pub const MAX_BPM: u32 = 200;
pub const MAX_VOLUME: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("scale name cannot be empty")]
    EmptyScaleName,

    #[error("scale already present: {0}")]
    DuplicateScale(String),

    #[error("repetitions must be between 1 and 10, got {0}")]
    InvalidRepetitions(u32),

    #[error("bpm must be between 40 and 200, got {0}")]
    BpmOutOfRange(u32),

    #[error("volume must be at most 100, got {0}")]
    VolumeOutOfRange(u32),
}

/// Pitch of the metronome click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Low,
    #[default]
    Medium,
    High,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Low, Tone::Medium, Tone::High];

    #[must_use]
    pub fn frequency_hz(self) -> f32 {
        match self {
            Tone::Low => 220.0,
            Tone::Medium => 440.0,
            Tone::High => 880.0,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Low => "low",
            Tone::Medium => "medium",
            Tone::High => "high",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Tone::Low),
            "medium" => Some(Tone::Medium),
            "high" => Some(Tone::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetronomeSettings {
    enabled: bool,
    bpm: u32,
    volume: u32,
    tone: Tone,
}

impl MetronomeSettings {
    /// Validate persisted metronome values.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when bpm or volume fall outside their ranges.
    pub fn from_persisted(
        enabled: bool,
        bpm: u32,
        volume: u32,
        tone: Tone,
    ) -> Result<Self, SettingsError> {
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return Err(SettingsError::BpmOutOfRange(bpm));
        }
        if volume > MAX_VOLUME {
            return Err(SettingsError::VolumeOutOfRange(volume));
        }
        Ok(Self {
            enabled,
            bpm,
            volume,
            tone,
        })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    #[must_use]
    pub fn volume(&self) -> u32 {
        self.volume
    }

    #[must_use]
    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Milliseconds between two clicks.
    #[must_use]
    pub fn beat_interval_ms(&self) -> u64 {
        60_000 / u64::from(self.bpm.max(1))
    }

    /// Linear output gain in `0.0..=1.0`.
    #[must_use]
    pub fn gain(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let volume = self.volume as f32;
        volume / 100.0
    }

    #[must_use]
    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// Returns a copy with `bpm` clamped to the supported range.
    #[must_use]
    pub fn with_bpm(self, bpm: u32) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            ..self
        }
    }

    /// Returns a copy with `volume` clamped to `0..=100`.
    #[must_use]
    pub fn with_volume(self, volume: u32) -> Self {
        Self {
            volume: volume.min(MAX_VOLUME),
            ..self
        }
    }

    #[must_use]
    pub fn with_tone(self, tone: Tone) -> Self {
        Self { tone, ..self }
    }
}

impl Default for MetronomeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bpm: 80,
            volume: 70,
            tone: Tone::Medium,
        }
    }
}

/// User-owned practice configuration.
///
/// Every update returns a new value; the session replaces its settings as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSettings {
    scales: Vec<String>,
    repetitions_required: u32,
    metronome: MetronomeSettings,
}

impl PracticeSettings {
    /// Validate and assemble settings loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for empty or duplicate scale names and out of range repetitions.
    pub fn from_persisted(
        scales: Vec<String>,
        repetitions_required: u32,
        metronome: MetronomeSettings,
    ) -> Result<Self, SettingsError> {
        if !(MIN_REPETITIONS..=MAX_REPETITIONS).contains(&repetitions_required) {
            return Err(SettingsError::InvalidRepetitions(repetitions_required));
        }
        for (idx, name) in scales.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SettingsError::EmptyScaleName);
            }
            if scales[..idx].contains(name) {
                return Err(SettingsError::DuplicateScale(name.clone()));
            }
        }
        Ok(Self {
            scales,
            repetitions_required,
            metronome,
        })
    }

    #[must_use]
    pub fn scales(&self) -> &[String] {
        &self.scales
    }

    #[must_use]
    pub fn repetitions_required(&self) -> u32 {
        self.repetitions_required
    }

    #[must_use]
    pub fn metronome(&self) -> MetronomeSettings {
        self.metronome
    }

    /// Returns a copy with `repetitions_required` clamped to `1..=10`.
    #[must_use]
    pub fn with_repetitions_required(&self, repetitions: u32) -> Self {
        Self {
            repetitions_required: repetitions.clamp(MIN_REPETITIONS, MAX_REPETITIONS),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_metronome(&self, metronome: MetronomeSettings) -> Self {
        Self {
            metronome,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_metronome_enabled(&self, enabled: bool) -> Self {
        self.with_metronome(self.metronome.with_enabled(enabled))
    }

    #[must_use]
    pub fn with_bpm(&self, bpm: u32) -> Self {
        self.with_metronome(self.metronome.with_bpm(bpm))
    }

    #[must_use]
    pub fn with_volume(&self, volume: u32) -> Self {
        self.with_metronome(self.metronome.with_volume(volume))
    }

    #[must_use]
    pub fn with_tone(&self, tone: Tone) -> Self {
        self.with_metronome(self.metronome.with_tone(tone))
    }

    /// Append a scale after trimming its name.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::EmptyScaleName` or `SettingsError::DuplicateScale`;
    /// the settings are left untouched in both cases.
    pub fn with_scale_added(&self, name: &str) -> Result<Self, SettingsError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SettingsError::EmptyScaleName);
        }
        if self.scales.iter().any(|existing| existing == name) {
            return Err(SettingsError::DuplicateScale(name.to_owned()));
        }
        let mut scales = self.scales.clone();
        scales.push(name.to_owned());
        Ok(Self {
            scales,
            ..self.clone()
        })
    }

    /// Remove a scale by name. Unknown names leave the list as is.
    #[must_use]
    pub fn with_scale_removed(&self, name: &str) -> Self {
        Self {
            scales: self
                .scales
                .iter()
                .filter(|existing| existing.as_str() != name)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            scales: DEFAULT_SCALES.iter().map(|name| (*name).to_owned()).collect(),
            repetitions_required: DEFAULT_REPETITIONS,
            metronome: MetronomeSettings::default(),
        }
    }
}
