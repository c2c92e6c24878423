use std::sync::Arc;

use scaled_core::model::{AcceptOutcome, PracticeSettings, PracticeState};
use services::{ClickOutput, Metronome, PracticeSession, SessionEvent, SettingsChange};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticeIntent {
    Accept,
    Decline,
    Reset,
    ToggleMetronome,
}

/// What the view has to do after an intent or a poll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PracticeEffects {
    /// Settings or state changed and should be written back.
    pub persist: bool,
    /// Name of a scale that was just completed.
    pub celebrate: Option<String>,
}

impl PracticeEffects {
    fn merge(&mut self, other: PracticeEffects) {
        self.persist |= other.persist;
        if other.celebrate.is_some() {
            self.celebrate = other.celebrate;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaleCardVm {
    pub name: String,
    pub success_count: u32,
    pub repetitions_required: u32,
    pub count_label: String,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerRowVm {
    pub name: String,
    pub count_label: String,
    pub percent: u32,
    pub completed: bool,
    pub is_current: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetronomeIndicatorVm {
    pub enabled: bool,
    pub playing: bool,
    pub bpm: u32,
}

/// Render-ready snapshot of a practice session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeScreenVm {
    pub completed_label: String,
    pub total: usize,
    pub all_completed: bool,
    pub current: Option<ScaleCardVm>,
    pub tracker: Vec<TrackerRowVm>,
    pub metronome: MetronomeIndicatorVm,
}

impl PracticeScreenVm {
    #[must_use]
    pub fn mastered_label(&self) -> String {
        format!("You've mastered all {} scales", self.total)
    }
}

/// Owns the live session for the practice and settings views.
pub struct PracticeVm {
    session: PracticeSession,
}

impl PracticeVm {
    #[must_use]
    pub fn new(session: PracticeSession) -> Self {
        Self { session }
    }

    /// Attach a metronome rendering through `output`.
    #[must_use]
    pub fn with_output(session: PracticeSession, output: Arc<dyn ClickOutput>) -> Self {
        let metronome = Metronome::new(session.settings().metronome(), output);
        Self::new(session.with_metronome(metronome))
    }

    #[must_use]
    pub fn settings(&self) -> &PracticeSettings {
        self.session.settings()
    }

    #[must_use]
    pub fn state(&self) -> &PracticeState {
        self.session.state()
    }

    #[must_use]
    pub fn has_pending_timers(&self) -> bool {
        self.session.next_deadline().is_some()
    }

    pub fn dispatch(&mut self, intent: PracticeIntent) -> PracticeEffects {
        match intent {
            PracticeIntent::Accept => {
                let outcome = self.session.accept();
                PracticeEffects {
                    persist: !matches!(outcome, AcceptOutcome::Ignored),
                    celebrate: None,
                }
            }
            PracticeIntent::Decline => {
                self.session.decline();
                PracticeEffects {
                    persist: true,
                    celebrate: None,
                }
            }
            PracticeIntent::Reset => {
                self.session.reset();
                PracticeEffects {
                    persist: true,
                    celebrate: None,
                }
            }
            PracticeIntent::ToggleMetronome => {
                self.session.toggle_metronome();
                PracticeEffects::default()
            }
        }
    }

    /// Fire due timers on the session clock.
    pub fn tick(&mut self) -> PracticeEffects {
        let mut effects = PracticeEffects::default();
        for event in self.session.poll() {
            effects.merge(match event {
                SessionEvent::Advanced => PracticeEffects {
                    persist: true,
                    celebrate: None,
                },
                SessionEvent::Celebrate { scale } => PracticeEffects {
                    persist: false,
                    celebrate: Some(scale),
                },
            });
        }
        effects
    }

    pub fn replace_settings(&mut self, next: PracticeSettings) -> SettingsChange {
        self.session.update_settings(next)
    }

    #[must_use]
    pub fn screen(&self) -> PracticeScreenVm {
        map_practice_screen(
            self.session.settings(),
            self.session.state(),
            self.session.metronome_playing(),
        )
    }
}

#[must_use]
pub fn map_practice_screen(
    settings: &PracticeSettings,
    state: &PracticeState,
    metronome_playing: bool,
) -> PracticeScreenVm {
    let required = settings.repetitions_required();
    let total = state.scale_progress().len();
    let current = state.current_scale();
    let current_name = current.map(|scale| scale.name());

    let tracker = state
        .scale_progress()
        .iter()
        .map(|scale| TrackerRowVm {
            name: scale.name().to_owned(),
            count_label: format!("{}/{required}", scale.success_count()),
            percent: progress_percent(scale.success_count(), required),
            completed: scale.completed(),
            is_current: current_name == Some(scale.name()),
        })
        .collect();

    let metronome = settings.metronome();
    PracticeScreenVm {
        completed_label: format!("{} of {total} scales completed", state.completed_count()),
        total,
        all_completed: state.all_completed(),
        current: current.map(|scale| ScaleCardVm {
            name: scale.name().to_owned(),
            success_count: scale.success_count(),
            repetitions_required: required,
            count_label: format!("{} / {required}", scale.success_count()),
            completed: scale.completed(),
        }),
        tracker,
        metronome: MetronomeIndicatorVm {
            enabled: metronome.enabled(),
            playing: metronome_playing,
            bpm: metronome.bpm(),
        },
    }
}

fn progress_percent(count: u32, required: u32) -> u32 {
    if required == 0 {
        return 100;
    }
    (count.saturating_mul(100) / required).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use scaled_core::model::MetronomeSettings;
    use scaled_core::time::fixed_clock;

    fn vm(scales: &[&str], reps: u32) -> PracticeVm {
        let settings = PracticeSettings::from_persisted(
            scales.iter().map(|s| (*s).to_owned()).collect(),
            reps,
            MetronomeSettings::default(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let state = PracticeState::initialize(&settings, &mut rng);
        PracticeVm::new(PracticeSession::with_rng(settings, state, fixed_clock(), rng))
    }

    #[test]
    fn screen_reports_counts_and_marks_current_scale() {
        let mut vm = vm(&["C Major", "G Major"], 3);
        vm.dispatch(PracticeIntent::Accept);

        let screen = vm.screen();
        assert_eq!(screen.completed_label, "0 of 2 scales completed");
        let card = screen.current.clone().unwrap();
        assert_eq!(card.count_label, "1 / 3");
        assert!(!card.completed);

        let current_rows: Vec<_> = screen.tracker.iter().filter(|row| row.is_current).collect();
        assert_eq!(current_rows.len(), 1);
        assert_eq!(current_rows[0].name, card.name);
        assert_eq!(current_rows[0].count_label, "1/3");
        assert_eq!(current_rows[0].percent, 33);
    }

    #[test]
    fn completed_scale_disables_card_and_celebrates_on_tick() {
        let mut vm = vm(&["C Major", "G Major"], 1);
        let effects = vm.dispatch(PracticeIntent::Accept);
        assert!(effects.persist);

        let screen = vm.screen();
        assert!(screen.current.unwrap().completed);
        assert_eq!(screen.completed_label, "1 of 2 scales completed");
        assert!(vm.has_pending_timers());
    }

    #[test]
    fn ignored_accept_does_not_persist() {
        let mut vm = vm(&["C Major"], 1);
        vm.dispatch(PracticeIntent::Accept);
        let effects = vm.dispatch(PracticeIntent::Accept);
        assert!(!effects.persist);
        assert!(vm.screen().all_completed);
    }

    #[test]
    fn empty_rotation_shows_completion() {
        let vm = vm(&[], 3);
        let screen = vm.screen();
        assert!(screen.all_completed);
        assert!(screen.current.is_none());
        assert_eq!(screen.mastered_label(), "You've mastered all 0 scales");
    }

    #[test]
    fn metronome_indicator_follows_settings() {
        let mut vm = vm(&["C Major"], 3);
        let next = vm.settings().with_bpm(144).with_metronome_enabled(false);
        let change = vm.replace_settings(next);

        assert!(change.metronome_changed);
        let indicator = vm.screen().metronome;
        assert!(!indicator.enabled);
        assert!(!indicator.playing);
        assert_eq!(indicator.bpm, 144);
    }

    #[test]
    fn progress_percent_is_capped() {
        assert_eq!(progress_percent(5, 3), 100);
        assert_eq!(progress_percent(0, 3), 0);
    }
}
