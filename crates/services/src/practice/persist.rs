use std::sync::Arc;

use scaled_core::model::{PracticeSettings, PracticeState};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::service::PracticeService;

/// Settings and state captured after a session mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub settings: PracticeSettings,
    pub state: PracticeState,
}

/// Queues snapshots for a [`SnapshotWriter`].
#[derive(Clone)]
pub struct SnapshotSender {
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl SnapshotSender {
    /// Queue a snapshot. Returns `false` once the writer has stopped.
    pub fn send(&self, settings: PracticeSettings, state: PracticeState) -> bool {
        self.tx.send(Snapshot { settings, state }).is_ok()
    }
}

/// Persists queued snapshots one at a time, in the order they were queued.
///
/// Snapshots that pile up behind a slow write are collapsed to the newest one.
/// Settings are written only when they differ from the last ones written.
pub struct SnapshotWriter {
    practice: Arc<PracticeService>,
    rx: mpsc::UnboundedReceiver<Snapshot>,
    written_settings: Option<PracticeSettings>,
}

impl SnapshotWriter {
    #[must_use]
    pub fn channel(practice: Arc<PracticeService>) -> (SnapshotSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = Self {
            practice,
            rx,
            written_settings: None,
        };
        (SnapshotSender { tx }, writer)
    }

    /// Drain the queue until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(mut snapshot) = self.rx.recv().await {
            while let Ok(newer) = self.rx.try_recv() {
                snapshot = newer;
            }
            self.write(snapshot).await;
        }
        debug!("snapshot writer stopped");
    }

    async fn write(&mut self, snapshot: Snapshot) {
        let Snapshot { settings, state } = snapshot;
        if self.written_settings.as_ref() != Some(&settings) {
            match self.practice.settings().save(&settings).await {
                Ok(()) => self.written_settings = Some(settings),
                Err(err) => warn!(%err, "failed to save settings"),
            }
        }
        if let Err(err) = self.practice.save_state(&state).await {
            warn!(%err, "failed to save practice state");
        }
    }
}
