use scaled_core::model::{
    MAX_BPM, MAX_REPETITIONS, MAX_VOLUME, MIN_BPM, MIN_REPETITIONS, PracticeSettings, Tone,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsIntent {
    SetRepetitions(u32),
    SetMetronomeEnabled(bool),
    SetBpm(u32),
    SetVolume(u32),
    SetTone(Tone),
    AddScale(String),
    RemoveScale(String),
}

/// Build the next settings value for `intent`.
///
/// Rejected edits (empty or duplicate scale names) return `None` and leave
/// the settings untouched.
#[must_use]
pub fn apply_settings_intent(
    settings: &PracticeSettings,
    intent: SettingsIntent,
) -> Option<PracticeSettings> {
    let next = match intent {
        SettingsIntent::SetRepetitions(value) => settings.with_repetitions_required(value),
        SettingsIntent::SetMetronomeEnabled(enabled) => settings.with_metronome_enabled(enabled),
        SettingsIntent::SetBpm(bpm) => settings.with_bpm(bpm),
        SettingsIntent::SetVolume(volume) => settings.with_volume(volume),
        SettingsIntent::SetTone(tone) => settings.with_tone(tone),
        SettingsIntent::AddScale(name) => settings.with_scale_added(&name).ok()?,
        SettingsIntent::RemoveScale(name) => settings.with_scale_removed(&name),
    };
    Some(next)
}

/// Add the scale typed into `input`. The field is cleared only when the name
/// was accepted, so a rejected entry stays editable.
pub fn submit_new_scale(
    settings: &PracticeSettings,
    input: &mut String,
) -> Option<PracticeSettings> {
    let next = apply_settings_intent(settings, SettingsIntent::AddScale(input.clone()))?;
    input.clear();
    Some(next)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToneOptionVm {
    pub value: &'static str,
    pub label: String,
    pub selected: bool,
}

/// Form values for the settings view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsFormVm {
    pub repetitions: u32,
    pub repetitions_range: (u32, u32),
    pub metronome_enabled: bool,
    pub bpm: u32,
    pub bpm_range: (u32, u32),
    pub volume: u32,
    pub volume_max: u32,
    pub tones: Vec<ToneOptionVm>,
    pub scales: Vec<String>,
}

#[must_use]
pub fn map_settings_form(settings: &PracticeSettings) -> SettingsFormVm {
    let metronome = settings.metronome();
    SettingsFormVm {
        repetitions: settings.repetitions_required(),
        repetitions_range: (MIN_REPETITIONS, MAX_REPETITIONS),
        metronome_enabled: metronome.enabled(),
        bpm: metronome.bpm(),
        bpm_range: (MIN_BPM, MAX_BPM),
        volume: metronome.volume(),
        volume_max: MAX_VOLUME,
        tones: Tone::ALL
            .iter()
            .map(|tone| ToneOptionVm {
                value: tone.as_str(),
                label: tone_label(*tone),
                selected: *tone == metronome.tone(),
            })
            .collect(),
        scales: settings.scales().to_vec(),
    }
}

fn tone_label(tone: Tone) -> String {
    let name = match tone {
        Tone::Low => "Low",
        Tone::Medium => "Medium",
        Tone::High => "High",
    };
    format!("{name} ({} Hz)", tone.frequency_hz())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_and_blank_scales_are_rejected() {
        let settings = PracticeSettings::default();
        assert!(apply_settings_intent(&settings, SettingsIntent::AddScale("C Major".into())).is_none());
        assert!(apply_settings_intent(&settings, SettingsIntent::AddScale("   ".into())).is_none());

        let next =
            apply_settings_intent(&settings, SettingsIntent::AddScale("  F# Minor ".into())).unwrap();
        assert_eq!(next.scales().last().map(String::as_str), Some("F# Minor"));
    }

    #[test]
    fn rejected_scale_stays_in_the_input() {
        let settings = PracticeSettings::default();

        let mut input = String::from("C Major");
        assert!(submit_new_scale(&settings, &mut input).is_none());
        assert_eq!(input, "C Major");

        let mut input = String::from("F# Minor");
        let next = submit_new_scale(&settings, &mut input).unwrap();
        assert!(input.is_empty());
        assert_eq!(next.scales().len(), settings.scales().len() + 1);
    }

    #[test]
    fn slider_values_are_clamped() {
        let settings = PracticeSettings::default();
        let next = apply_settings_intent(&settings, SettingsIntent::SetBpm(500)).unwrap();
        assert_eq!(next.metronome().bpm(), MAX_BPM);
        let next = apply_settings_intent(&next, SettingsIntent::SetRepetitions(0)).unwrap();
        assert_eq!(next.repetitions_required(), MIN_REPETITIONS);
    }

    #[test]
    fn form_lists_tones_with_frequencies() {
        let settings = PracticeSettings::default().with_tone(Tone::High);
        let form = map_settings_form(&settings);
        let labels: Vec<_> = form.tones.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Low (220 Hz)", "Medium (440 Hz)", "High (880 Hz)"]);
        assert!(form.tones[2].selected);
        assert_eq!(form.scales.len(), 13);
    }
}
