use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use crate::error::AudioError;

use super::output::ClickOutput;
use super::voice::{Click, ClickVoice};

/// Click output on the default audio device.
///
/// `cpal::Stream` is not `Send`, so the stream lives on a dedicated thread for
/// the whole lifetime of the output; clicks reach the audio callback through a
/// shared `ClickVoice`.
pub struct CpalOutput {
    voice: Arc<Mutex<ClickVoice>>,
    shutdown: Mutex<Option<Sender<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CpalOutput {
    /// Open the default output device and start a silent stream.
    ///
    /// # Errors
    ///
    /// Returns `AudioError` when no device exists, the device only offers
    /// non-float samples, or the stream cannot be started.
    pub fn open() -> Result<Self, AudioError> {
        let voice = Arc::new(Mutex::new(ClickVoice::new(48_000)));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let worker_voice = Arc::clone(&voice);
        let worker = thread::Builder::new()
            .name("metronome-audio".into())
            .spawn(move || {
                let stream = match build_stream(&worker_voice) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                if let Err(err) = stream.play() {
                    let _ = ready_tx.send(Err(AudioError::Stream(err.to_string())));
                    return;
                }
                let _ = ready_tx.send(Ok(()));
                // Blocks until the output is closed (sender dropped).
                let _ = shutdown_rx.recv();
                drop(stream);
            })
            .map_err(|err| AudioError::Stream(err.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let _ = worker.join();
                return Err(err);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(AudioError::Stream("audio thread exited early".into()));
            }
        }

        info!("metronome audio output opened");
        Ok(Self {
            voice,
            shutdown: Mutex::new(Some(shutdown_tx)),
            worker: Mutex::new(Some(worker)),
        })
    }
}

fn build_stream(voice: &Arc<Mutex<ClickVoice>>) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    let config = device
        .default_output_config()
        .map_err(|err| AudioError::Stream(err.to_string()))?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(AudioError::UnsupportedFormat(format!(
            "{:?}",
            config.sample_format()
        )));
    }

    let channels = usize::from(config.channels()).max(1);
    let sample_rate = config.sample_rate().0;
    if let Ok(mut guard) = voice.lock() {
        *guard = ClickVoice::new(sample_rate);
    }

    let stream_config: cpal::StreamConfig = config.into();
    let callback_voice = Arc::clone(voice);
    device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let Ok(mut voice) = callback_voice.try_lock() else {
                    data.fill(0.0);
                    return;
                };
                for frame in data.chunks_mut(channels) {
                    frame.fill(voice.next_sample());
                }
            },
            |err| error!(%err, "metronome audio stream error"),
            None,
        )
        .map_err(|err| AudioError::Stream(err.to_string()))
}

impl ClickOutput for CpalOutput {
    fn play(&self, click: Click) -> Result<(), AudioError> {
        if !self.is_available() {
            return Err(AudioError::Closed);
        }
        let mut voice = self
            .voice
            .lock()
            .map_err(|err| AudioError::Stream(err.to_string()))?;
        voice.trigger(click);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.shutdown.lock().is_ok_and(|guard| guard.is_some())
    }

    fn close(&self) {
        if let Ok(mut guard) = self.shutdown.lock() {
            guard.take();
        }
        let worker = self.worker.lock().ok().and_then(|mut guard| guard.take());
        if let Some(worker) = worker {
            let _ = worker.join();
            info!("metronome audio output closed");
        }
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.close();
    }
}
