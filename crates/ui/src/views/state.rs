use dioxus::prelude::*;
use scaled_core::model::{PracticeSettings, PracticeState};
use services::SnapshotSender;
use tracing::warn;

use crate::vm::{PracticeEffects, PracticeVm};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Error(ViewError),
}

/// The live session shared by every route.
pub type SessionSlot = Signal<ViewState<PracticeVm>>;

/// Queue of snapshots persisted in order by a single background writer.
pub type PersistQueue = SnapshotSender;

/// Clone what needs persisting out of the slot, if a session is loaded.
#[must_use]
pub fn snapshot(slot: &SessionSlot) -> Option<(PracticeSettings, PracticeState)> {
    match &*slot.peek() {
        ViewState::Ready(vm) => Some((vm.settings().clone(), vm.state().clone())),
        _ => None,
    }
}

/// Transient banner text shown after a scale is completed.
pub type CelebrationSlot = Signal<Option<String>>;

const CELEBRATION_VISIBLE: std::time::Duration = std::time::Duration::from_millis(2_500);

/// Persist and celebrate as the session asked.
pub fn apply_effects(
    persist: &PersistQueue,
    slot: &SessionSlot,
    mut celebration: CelebrationSlot,
    effects: PracticeEffects,
) {
    if effects.persist {
        if let Some((settings, state)) = snapshot(slot) {
            if !persist.send(settings, state) {
                warn!("snapshot writer stopped; change not saved");
            }
        }
    }
    if let Some(scale) = effects.celebrate {
        celebration.set(Some(scale.clone()));
        spawn(async move {
            let mut celebration = celebration;
            tokio::time::sleep(CELEBRATION_VISIBLE).await;
            if celebration.peek().as_deref() == Some(scale.as_str()) {
                celebration.set(None);
            }
        });
    }
}
