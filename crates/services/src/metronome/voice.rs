use std::f32::consts::TAU;

use scaled_core::model::MetronomeSettings;

/// Length of one click.
pub const CLICK_DURATION_MS: u32 = 100;
/// Gain multiplier a click has decayed to when it ends.
pub const CLICK_FLOOR: f32 = 0.001;

/// One audible beat: a sine at the tone frequency with a starting gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub frequency_hz: f32,
    pub gain: f32,
}

impl Click {
    #[must_use]
    pub fn from_settings(settings: &MetronomeSettings) -> Self {
        Self {
            frequency_hz: settings.tone().frequency_hz(),
            gain: settings.gain(),
        }
    }
}

/// Sample generator for a single decaying click.
///
/// Retriggering replaces the sounding click, so two beats never overlap.
#[derive(Debug, Clone)]
pub struct ClickVoice {
    sample_rate: u32,
    phase: f32,
    step: f32,
    gain: f32,
    decay: f32,
    remaining: u32,
}

impl ClickVoice {
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            phase: 0.0,
            step: 0.0,
            gain: 0.0,
            decay: 1.0,
            remaining: 0,
        }
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples a click lasts at this sample rate.
    #[must_use]
    pub fn click_len(&self) -> u32 {
        self.sample_rate * CLICK_DURATION_MS / 1000
    }

    pub fn trigger(&mut self, click: Click) {
        let len = self.click_len().max(1);
        #[allow(clippy::cast_precision_loss)]
        let (len_f, rate_f) = (len as f32, self.sample_rate as f32);
        self.phase = 0.0;
        self.step = click.frequency_hz / rate_f;
        self.gain = click.gain.clamp(0.0, 1.0);
        self.decay = CLICK_FLOOR.powf(1.0 / len_f);
        self.remaining = len;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.remaining == 0 {
            return 0.0;
        }
        let sample = (self.phase * TAU).sin() * self.gain;
        self.phase = (self.phase + self.step).fract();
        self.gain *= self.decay;
        self.remaining -= 1;
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaled_core::model::Tone;

    #[test]
    fn click_follows_tone_and_volume() {
        let settings = MetronomeSettings::default()
            .with_tone(Tone::High)
            .with_volume(50);
        let click = Click::from_settings(&settings);
        assert!((click.frequency_hz - 880.0).abs() < f32::EPSILON);
        assert!((click.gain - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn voice_decays_to_silence_within_click_length() {
        let mut voice = ClickVoice::new(48_000);
        voice.trigger(Click {
            frequency_hz: 440.0,
            gain: 1.0,
        });
        assert_eq!(voice.click_len(), 4_800);

        let mut peak_tail = 0.0_f32;
        for idx in 0..voice.click_len() {
            let sample = voice.next_sample();
            assert!(sample.abs() <= 1.0);
            if idx >= voice.click_len() - 48 {
                peak_tail = peak_tail.max(sample.abs());
            }
        }
        assert!(peak_tail < 0.002, "tail too loud: {peak_tail}");
        assert!(!voice.is_active());
        assert!(voice.next_sample().abs() < f32::EPSILON);
    }

    #[test]
    fn silent_voice_outputs_zero() {
        let mut voice = ClickVoice::new(44_100);
        assert!(!voice.is_active());
        assert!(voice.next_sample().abs() < f32::EPSILON);
    }

    #[test]
    fn zero_volume_click_is_silent() {
        let mut voice = ClickVoice::new(8_000);
        voice.trigger(Click {
            frequency_hz: 220.0,
            gain: 0.0,
        });
        assert!((0..100).all(|_| voice.next_sample().abs() < f32::EPSILON));
    }
}
