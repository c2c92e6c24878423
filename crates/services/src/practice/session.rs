use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scaled_core::Clock;
use scaled_core::model::{
    AcceptOutcome, PracticeSettings, PracticeState, ScaleProgress, scales_changed,
};
use tracing::{debug, info};

use crate::metronome::Metronome;
use crate::timers::{ADVANCE_DELAY_MS, CELEBRATION_DELAY_MS, DueTimer, SessionTimers};

/// Something the view should react to after polling the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The deferred move to the next incomplete scale happened.
    Advanced,
    /// A scale was just completed.
    Celebrate { scale: String },
}

/// Which parts of the settings an update touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub scales_changed: bool,
    pub repetitions_changed: bool,
    pub metronome_changed: bool,
}

impl SettingsChange {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.scales_changed || self.repetitions_changed || self.metronome_changed)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One practice run: settings, rotation state, pending timers and the metronome.
///
/// Timers are deadlines polled by the caller, so nothing fires after the
/// session is gone.
pub struct PracticeSession {
    settings: PracticeSettings,
    state: PracticeState,
    clock: Clock,
    rng: StdRng,
    timers: SessionTimers,
    metronome: Option<Metronome>,
}

impl PracticeSession {
    #[must_use]
    pub fn new(settings: PracticeSettings, state: PracticeState, clock: Clock) -> Self {
        Self::with_rng(settings, state, clock, StdRng::from_os_rng())
    }

    /// Start a fresh run over `settings`.
    #[must_use]
    pub fn initialize(settings: PracticeSettings, clock: Clock) -> Self {
        let mut rng = StdRng::from_os_rng();
        let state = PracticeState::initialize(&settings, &mut rng);
        Self::with_rng(settings, state, clock, rng)
    }

    /// Build a session with an explicit random source (seeded in tests).
    #[must_use]
    pub fn with_rng(
        settings: PracticeSettings,
        state: PracticeState,
        clock: Clock,
        rng: StdRng,
    ) -> Self {
        Self {
            settings,
            state,
            clock,
            rng,
            timers: SessionTimers::new(),
            metronome: None,
        }
    }

    /// Attach a metronome; it adopts the session's metronome settings.
    #[must_use]
    pub fn with_metronome(mut self, mut metronome: Metronome) -> Self {
        metronome.apply_settings(self.settings.metronome());
        self.metronome = Some(metronome);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> &PracticeState {
        &self.state
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn current_scale(&self) -> Option<&ScaleProgress> {
        self.state.current_scale()
    }

    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.state.all_completed()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn has_pending_advance(&self) -> bool {
        self.timers.has_pending_advance()
    }

    #[must_use]
    pub fn metronome_playing(&self) -> bool {
        self.metronome.as_ref().is_some_and(Metronome::is_playing)
    }

    /// Count a repetition of the current scale and schedule the move onward.
    pub fn accept(&mut self) -> AcceptOutcome {
        self.timers.cancel_advance();
        let outcome = self.state.accept(self.settings.repetitions_required());

        if let AcceptOutcome::Completed { name } = &outcome {
            info!(scale = %name, "scale completed");
            self.timers.schedule_celebration(
                self.clock.deadline_after(CELEBRATION_DELAY_MS),
                name.clone(),
            );
        }
        if !self.state.practice_order().is_empty() {
            self.timers
                .schedule_advance(self.clock.deadline_after(ADVANCE_DELAY_MS));
        }
        debug!(?outcome, "accept");
        outcome
    }

    /// Skip the current scale right away.
    pub fn decline(&mut self) {
        self.timers.cancel_advance();
        self.state.decline();
        debug!(index = self.state.current_scale_index(), "decline");
    }

    /// Fire every timer due on the session clock.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        self.poll_at(self.clock.now())
    }

    /// Fire every timer due at `now`, earliest deadline first.
    pub fn poll_at(&mut self, now: DateTime<Utc>) -> Vec<SessionEvent> {
        self.timers
            .take_due(now)
            .into_iter()
            .map(|timer| match timer {
                DueTimer::Advance => {
                    self.state.advance_to_next_incomplete();
                    SessionEvent::Advanced
                }
                DueTimer::Celebration { scale } => SessionEvent::Celebrate { scale },
            })
            .collect()
    }

    /// Move a fixed clock forward and fire whatever became due.
    pub fn advance_clock(&mut self, delta: Duration) -> Vec<SessionEvent> {
        self.clock.advance(delta);
        self.poll()
    }

    /// Replace the settings as a whole.
    ///
    /// Progress is re-derived only when the scale list changed; repetitions
    /// alone never recompute completion.
    pub fn update_settings(&mut self, next: PracticeSettings) -> SettingsChange {
        let change = SettingsChange {
            scales_changed: scales_changed(self.settings.scales(), next.scales()),
            repetitions_changed: self.settings.repetitions_required()
                != next.repetitions_required(),
            metronome_changed: self.settings.metronome() != next.metronome(),
        };

        if change.scales_changed {
            self.state = self.state.reconcile(&self.settings, &next, &mut self.rng);
            self.timers.cancel_advance();
            info!(scales = next.scales().len(), "scale list changed; rotation rebuilt");
        }
        if change.metronome_changed {
            if let Some(metronome) = self.metronome.as_mut() {
                metronome.apply_settings(next.metronome());
            }
        }
        self.settings = next;
        change
    }

    /// Discard all progress and reshuffle.
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.state = PracticeState::reset(&self.settings, &mut self.rng);
        info!("practice progress reset");
    }

    /// Start or stop the metronome. Returns whether it is now playing.
    pub fn toggle_metronome(&mut self) -> bool {
        if let Some(metronome) = self.metronome.as_mut() {
            metronome.toggle();
        }
        self.metronome_playing()
    }

    /// Cancel pending timers and release the metronome's audio output.
    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        if let Some(metronome) = self.metronome.as_mut() {
            metronome.shutdown();
        }
    }
}

impl Drop for PracticeSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
