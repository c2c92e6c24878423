//! Metronome click track: tempo loop, click synthesis and audio outputs.

#[cfg(feature = "cpal-output")]
mod cpal_output;
mod engine;
mod output;
mod voice;

#[cfg(feature = "cpal-output")]
pub use cpal_output::CpalOutput;
pub use engine::Metronome;
pub use output::{ClickOutput, SilentOutput};
pub use voice::{CLICK_DURATION_MS, CLICK_FLOOR, Click, ClickVoice};
