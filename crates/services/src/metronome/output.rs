use crate::error::AudioError;

use super::voice::Click;

/// Where metronome clicks are rendered.
pub trait ClickOutput: Send + Sync {
    /// Start sounding one click, replacing any click still decaying.
    ///
    /// # Errors
    ///
    /// Returns `AudioError` if the underlying device rejects the click.
    fn play(&self, click: Click) -> Result<(), AudioError>;

    /// False when no audio device backs this output.
    fn is_available(&self) -> bool {
        true
    }

    /// Release the audio device. Later clicks fail with `AudioError::Closed`.
    fn close(&self) {}
}

/// Output used when no audio device could be opened. The metronome stays idle with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentOutput;

impl ClickOutput for SilentOutput {
    fn play(&self, _click: Click) -> Result<(), AudioError> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}
