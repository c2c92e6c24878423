use std::collections::HashMap;

use rand::Rng;
use thiserror::Error;

use crate::model::{PracticeSettings, ScaleProgress};
use crate::rotation::{is_permutation, shuffled_order};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PracticeStateError {
    #[error("practice order is not a permutation of {len} scales")]
    InvalidOrder { len: usize },

    #[error("current index {index} is out of range for {len} scales")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("scale progress contains duplicate name: {0}")]
    DuplicateScale(String),
}

/// Result of accepting the current scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// No current scale, or it was already completed. Nothing changed.
    Ignored,
    /// One more repetition was counted; the scale is still incomplete.
    Counted { success_count: u32 },
    /// This repetition completed the scale.
    Completed { name: String },
}

impl AcceptOutcome {
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self, AcceptOutcome::Ignored)
    }
}

/// Rotation order and progress for one practice run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeState {
    current_scale_index: usize,
    scale_progress: Vec<ScaleProgress>,
    practice_order: Vec<usize>,
}

/// True when the scale list differs in length or in any positional name.
#[must_use]
pub fn scales_changed(previous: &[String], next: &[String]) -> bool {
    previous.len() != next.len() || previous.iter().zip(next).any(|(prev, new)| prev != new)
}

impl PracticeState {
    /// Zeroed progress for every configured scale in a freshly shuffled order.
    pub fn initialize<R: Rng + ?Sized>(settings: &PracticeSettings, rng: &mut R) -> Self {
        let scale_progress: Vec<_> = settings
            .scales()
            .iter()
            .map(|name| ScaleProgress::new(name.clone()))
            .collect();
        let practice_order = shuffled_order(scale_progress.len(), rng);
        Self {
            current_scale_index: 0,
            scale_progress,
            practice_order,
        }
    }

    /// Discards all progress and reshuffles.
    pub fn reset<R: Rng + ?Sized>(settings: &PracticeSettings, rng: &mut R) -> Self {
        Self::initialize(settings, rng)
    }

    /// Rehydrate a state loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns `PracticeStateError` if the order is not a permutation, the index
    /// is out of range, or two entries share a name.
    pub fn from_persisted(
        current_scale_index: usize,
        scale_progress: Vec<ScaleProgress>,
        practice_order: Vec<usize>,
    ) -> Result<Self, PracticeStateError> {
        let len = scale_progress.len();
        if !is_permutation(&practice_order, len) {
            return Err(PracticeStateError::InvalidOrder { len });
        }
        let index_ok = if len == 0 {
            current_scale_index == 0
        } else {
            current_scale_index < len
        };
        if !index_ok {
            return Err(PracticeStateError::IndexOutOfRange {
                index: current_scale_index,
                len,
            });
        }
        for (idx, entry) in scale_progress.iter().enumerate() {
            if scale_progress[..idx]
                .iter()
                .any(|other| other.name() == entry.name())
            {
                return Err(PracticeStateError::DuplicateScale(entry.name().to_owned()));
            }
        }
        Ok(Self {
            current_scale_index,
            scale_progress,
            practice_order,
        })
    }

    #[must_use]
    pub fn current_scale_index(&self) -> usize {
        self.current_scale_index
    }

    #[must_use]
    pub fn scale_progress(&self) -> &[ScaleProgress] {
        &self.scale_progress
    }

    #[must_use]
    pub fn practice_order(&self) -> &[usize] {
        &self.practice_order
    }

    /// True when the progress entries name exactly these scales, in this order.
    #[must_use]
    pub fn tracks_scales(&self, scales: &[String]) -> bool {
        self.scale_progress.len() == scales.len()
            && self
                .scale_progress
                .iter()
                .zip(scales)
                .all(|(entry, name)| entry.name() == name)
    }

    /// Re-derive the state after the scale list changed.
    ///
    /// When `previous` and `next` list the same scales in the same order the
    /// state is returned as is. Otherwise progress is carried over by name,
    /// new scales start at zero, removed scales are dropped, the order is
    /// reshuffled and the position returns to the start.
    #[must_use]
    pub fn reconcile<R: Rng + ?Sized>(
        &self,
        previous: &PracticeSettings,
        next: &PracticeSettings,
        rng: &mut R,
    ) -> Self {
        if !scales_changed(previous.scales(), next.scales()) {
            return self.clone();
        }
        self.rebuild_for(next.scales(), rng)
    }

    /// Rebuild progress over `scales`, keeping entries whose names survive.
    #[must_use]
    pub fn rebuild_for<R: Rng + ?Sized>(&self, scales: &[String], rng: &mut R) -> Self {
        let existing: HashMap<&str, &ScaleProgress> = self
            .scale_progress
            .iter()
            .map(|entry| (entry.name(), entry))
            .collect();

        let scale_progress: Vec<_> = scales
            .iter()
            .map(|name| {
                existing
                    .get(name.as_str())
                    .map_or_else(|| ScaleProgress::new(name.clone()), |entry| (*entry).clone())
            })
            .collect();
        let practice_order = shuffled_order(scale_progress.len(), rng);

        Self {
            current_scale_index: 0,
            scale_progress,
            practice_order,
        }
    }

    /// The scale currently presented, if any.
    #[must_use]
    pub fn current_scale(&self) -> Option<&ScaleProgress> {
        let progress_index = *self.practice_order.get(self.current_scale_index)?;
        self.scale_progress.get(progress_index)
    }

    fn current_scale_mut(&mut self) -> Option<&mut ScaleProgress> {
        let progress_index = *self.practice_order.get(self.current_scale_index)?;
        self.scale_progress.get_mut(progress_index)
    }

    /// Move to the next incomplete scale in rotation order.
    ///
    /// Scans at most one full lap starting after the current position. When
    /// every scale is completed the position still moves, landing on the last
    /// examined slot.
    pub fn advance_to_next_incomplete(&mut self) {
        let len = self.practice_order.len();
        if len == 0 {
            return;
        }

        let mut next = (self.current_scale_index + 1) % len;
        for _ in 0..len {
            let completed = self
                .scale_progress
                .get(self.practice_order[next])
                .is_some_and(ScaleProgress::completed);
            if !completed {
                break;
            }
            next = (next + 1) % len;
        }
        self.current_scale_index = next;
    }

    /// Count a successful repetition of the current scale.
    ///
    /// Already completed or missing scales are left untouched, so a repeated
    /// accept cannot over-count. Advancing is left to the caller.
    pub fn accept(&mut self, repetitions_required: u32) -> AcceptOutcome {
        let Some(scale) = self.current_scale_mut() else {
            return AcceptOutcome::Ignored;
        };
        if scale.completed() {
            return AcceptOutcome::Ignored;
        }

        if scale.record_success(repetitions_required) {
            AcceptOutcome::Completed {
                name: scale.name().to_owned(),
            }
        } else {
            AcceptOutcome::Counted {
                success_count: scale.success_count(),
            }
        }
    }

    /// Skip the current scale without touching its progress.
    pub fn decline(&mut self) {
        self.advance_to_next_incomplete();
    }

    /// True when no scale is left incomplete (vacuously true when empty).
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.scale_progress.iter().all(ScaleProgress::completed)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.scale_progress
            .iter()
            .filter(|entry| entry.completed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetronomeSettings;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn settings_with(scales: &[&str], repetitions: u32) -> PracticeSettings {
        PracticeSettings::from_persisted(
            scales.iter().map(|name| (*name).to_string()).collect(),
            repetitions,
            MetronomeSettings::default(),
        )
        .unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn initialize_zeroes_progress_and_shuffles_all_indices() {
        let settings = PracticeSettings::default();
        let state = PracticeState::initialize(&settings, &mut rng());

        assert_eq!(state.current_scale_index(), 0);
        assert_eq!(state.scale_progress().len(), settings.scales().len());
        assert!(is_permutation(state.practice_order(), settings.scales().len()));
        assert!(
            state
                .scale_progress()
                .iter()
                .all(|entry| entry.success_count() == 0 && !entry.completed())
        );
        assert!(state.tracks_scales(settings.scales()));
    }

    #[test]
    fn current_scale_resolves_through_order() {
        let state = PracticeState::from_persisted(
            1,
            vec![
                ScaleProgress::new("C Major"),
                ScaleProgress::new("G Major"),
                ScaleProgress::new("D Major"),
            ],
            vec![2, 0, 1],
        )
        .unwrap();
        assert_eq!(state.current_scale().map(ScaleProgress::name), Some("C Major"));

        let empty = PracticeState::initialize(&settings_with(&[], 3), &mut rng());
        assert!(empty.current_scale().is_none());
    }

    #[test]
    fn accept_counts_until_completion_and_fires_once() {
        let mut state = PracticeState::initialize(&settings_with(&["C Major"], 3), &mut rng());

        assert_eq!(state.accept(3), AcceptOutcome::Counted { success_count: 1 });
        assert_eq!(state.accept(3), AcceptOutcome::Counted { success_count: 2 });
        assert_eq!(
            state.accept(3),
            AcceptOutcome::Completed {
                name: "C Major".into()
            }
        );
        assert!(state.scale_progress()[0].completed());
        assert_eq!(state.accept(3), AcceptOutcome::Ignored);
        assert_eq!(state.scale_progress()[0].success_count(), 3);
    }

    #[test]
    fn accept_on_completed_scale_leaves_state_identical() {
        let mut state = PracticeState::from_persisted(
            0,
            vec![ScaleProgress::from_persisted("C Major", 3, true)],
            vec![0],
        )
        .unwrap();
        let before = state.clone();

        assert!(state.accept(3).is_ignored());
        assert_eq!(state, before);
    }

    #[test]
    fn accept_on_empty_state_is_ignored() {
        let mut state = PracticeState::initialize(&settings_with(&[], 3), &mut rng());
        assert!(state.accept(3).is_ignored());
    }

    #[test]
    fn completion_across_declines_fires_on_the_final_repetition() {
        let settings = settings_with(&["C Major", "G Major"], 2);
        let mut state = PracticeState::initialize(&settings, &mut rng());
        let target = state.current_scale().unwrap().name().to_owned();

        assert_eq!(state.accept(2), AcceptOutcome::Counted { success_count: 1 });
        state.decline();
        assert_ne!(state.current_scale().unwrap().name(), target);
        state.decline();
        assert_eq!(state.current_scale().unwrap().name(), target);
        assert_eq!(state.accept(2), AcceptOutcome::Completed { name: target });
    }

    #[test]
    fn advance_skips_completed_and_wraps() {
        let mut state = PracticeState::from_persisted(
            0,
            vec![
                ScaleProgress::from_persisted("C Major", 3, true),
                ScaleProgress::new("G Major"),
                ScaleProgress::new("D Major"),
            ],
            vec![2, 0, 1],
        )
        .unwrap();

        state.advance_to_next_incomplete();
        assert_eq!(state.current_scale_index(), 2);

        state.advance_to_next_incomplete();
        assert_eq!(state.current_scale_index(), 0);
    }

    #[test]
    fn advance_with_everything_completed_still_moves() {
        let mut state = PracticeState::from_persisted(
            0,
            vec![
                ScaleProgress::from_persisted("C Major", 3, true),
                ScaleProgress::from_persisted("G Major", 3, true),
                ScaleProgress::from_persisted("D Major", 3, true),
            ],
            vec![0, 1, 2],
        )
        .unwrap();

        state.advance_to_next_incomplete();
        assert_eq!(state.current_scale_index(), 1);
    }

    #[test]
    fn advance_on_empty_state_is_noop() {
        let mut state = PracticeState::initialize(&settings_with(&[], 3), &mut rng());
        state.advance_to_next_incomplete();
        assert_eq!(state.current_scale_index(), 0);
    }

    #[test]
    fn decline_keeps_progress() {
        let mut state = PracticeState::initialize(&settings_with(&["C Major", "G Major"], 3), &mut rng());
        state.accept(3);
        let progress = state.scale_progress().to_vec();
        state.decline();
        assert_eq!(state.scale_progress(), progress.as_slice());
        assert_eq!(state.current_scale_index(), 1);
    }

    #[test]
    fn reconcile_preserves_progress_by_name() {
        let previous = settings_with(&["C Major", "G Major"], 3);
        let next = settings_with(&["G Major", "D Major"], 3);
        let state = PracticeState::from_persisted(
            1,
            vec![
                ScaleProgress::from_persisted("C Major", 2, false),
                ScaleProgress::from_persisted("G Major", 3, true),
            ],
            vec![1, 0],
        )
        .unwrap();

        let reconciled = state.reconcile(&previous, &next, &mut rng());

        assert_eq!(
            reconciled.scale_progress(),
            &[
                ScaleProgress::from_persisted("G Major", 3, true),
                ScaleProgress::from_persisted("D Major", 0, false),
            ]
        );
        assert_eq!(reconciled.current_scale_index(), 0);
        assert!(is_permutation(reconciled.practice_order(), 2));
    }

    #[test]
    fn reconcile_ignores_non_scale_changes() {
        let previous = settings_with(&["C Major", "G Major", "D Major"], 3);
        let next = previous.with_repetitions_required(5).with_bpm(150);
        let mut state = PracticeState::initialize(&previous, &mut rng());
        state.accept(3);
        state.decline();

        let reconciled = state.reconcile(&previous, &next, &mut rng());
        assert_eq!(reconciled, state);
    }

    #[test]
    fn scales_changed_detects_reorder_and_length() {
        let a = vec!["C Major".to_string(), "G Major".to_string()];
        let b = vec!["G Major".to_string(), "C Major".to_string()];
        assert!(!scales_changed(&a, &a.clone()));
        assert!(scales_changed(&a, &b));
        assert!(scales_changed(&a, &a[..1]));
    }

    #[test]
    fn all_completed_is_vacuous_for_empty_list() {
        let empty = PracticeState::initialize(&settings_with(&[], 3), &mut rng());
        assert!(empty.all_completed());
        assert_eq!(empty.completed_count(), 0);

        let state = PracticeState::from_persisted(
            0,
            vec![
                ScaleProgress::from_persisted("C Major", 3, true),
                ScaleProgress::new("G Major"),
            ],
            vec![0, 1],
        )
        .unwrap();
        assert!(!state.all_completed());
        assert_eq!(state.completed_count(), 1);
    }

    #[test]
    fn persisted_state_is_validated() {
        let progress = vec![ScaleProgress::new("C Major"), ScaleProgress::new("G Major")];
        assert_eq!(
            PracticeState::from_persisted(0, progress.clone(), vec![0, 0]).unwrap_err(),
            PracticeStateError::InvalidOrder { len: 2 }
        );
        assert_eq!(
            PracticeState::from_persisted(2, progress, vec![1, 0]).unwrap_err(),
            PracticeStateError::IndexOutOfRange { index: 2, len: 2 }
        );
        let dup = vec![ScaleProgress::new("C Major"), ScaleProgress::new("C Major")];
        assert!(matches!(
            PracticeState::from_persisted(0, dup, vec![0, 1]),
            Err(PracticeStateError::DuplicateScale(_))
        ));
    }
}
