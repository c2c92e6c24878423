use std::sync::Arc;
use std::time::Duration;

use scaled_core::model::MetronomeSettings;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::output::ClickOutput;
use super::voice::Click;

/// Periodic click track driven by a tokio task.
///
/// The click loop is owned by the metronome: stopping, restarting and dropping
/// all abort it, so at most one loop is ever sounding.
pub struct Metronome {
    settings: MetronomeSettings,
    output: Arc<dyn ClickOutput>,
    task: Option<JoinHandle<()>>,
}

impl Metronome {
    #[must_use]
    pub fn new(settings: MetronomeSettings, output: Arc<dyn ClickOutput>) -> Self {
        Self {
            settings,
            output,
            task: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> MetronomeSettings {
        self.settings
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.task.is_some()
    }

    /// Start clicking. Does nothing when disabled, without an audio device, or
    /// outside a tokio runtime.
    pub fn start(&mut self) {
        if !self.settings.enabled() {
            debug!("metronome disabled; not starting");
            return;
        }
        if !self.output.is_available() {
            warn!("audio output unavailable; metronome stays idle");
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime; metronome stays idle");
            return;
        };

        self.abort_loop();
        let period = Duration::from_millis(self.settings.beat_interval_ms());
        let click = Click::from_settings(&self.settings);
        let output = Arc::clone(&self.output);
        self.task = Some(runtime.spawn(click_loop(output, period, click)));
        debug!(bpm = self.settings.bpm(), "metronome started");
    }

    pub fn stop(&mut self) {
        if self.abort_loop() {
            debug!("metronome stopped");
        }
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Adopt new settings. A playing metronome restarts at the new tempo and
    /// tone, or stops if it was disabled.
    pub fn apply_settings(&mut self, settings: MetronomeSettings) {
        if settings == self.settings {
            return;
        }
        self.settings = settings;
        if !self.is_playing() {
            return;
        }
        if settings.enabled() {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Stop and release the audio output.
    pub fn shutdown(&mut self) {
        self.stop();
        self.output.close();
    }

    fn abort_loop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        self.abort_loop();
    }
}

async fn click_loop(output: Arc<dyn ClickOutput>, period: Duration, click: Click) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = output.play(click) {
            warn!(%err, "metronome click failed");
        }
    }
}
