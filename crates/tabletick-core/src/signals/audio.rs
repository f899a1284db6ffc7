//! Speaker output through the default audio device.

use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

use super::emitter::SignalEmitter;
use super::tone::ToneSpec;
use crate::error::SignalError;

pub const SAMPLE_RATE: u32 = 44_100;

/// Plays synthesized tones on the default output device.
///
/// The device handle cannot leave the thread that opened it, so a player
/// thread owns it and receives rendered samples over a channel. Tones
/// overlap rather than queue.
pub struct AudioEmitter {
    samples: Mutex<Sender<Vec<f32>>>,
}

impl AudioEmitter {
    /// Open the default device.
    ///
    /// # Errors
    /// Fails when no output device can be opened.
    pub fn open() -> Result<Self, SignalError> {
        let (tx, rx) = mpsc::channel::<Vec<f32>>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        std::thread::spawn(move || {
            let (_stream, handle) = match OutputStream::try_default() {
                Ok(pair) => {
                    let _ = ready_tx.send(Ok(()));
                    pair
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            for samples in rx {
                let Ok(sink) = Sink::try_new(&handle) else {
                    continue;
                };
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
                sink.detach();
            }
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                samples: Mutex::new(tx),
            }),
            Ok(Err(message)) => Err(SignalError::Device(message)),
            Err(_) => Err(SignalError::Device("player thread exited".into())),
        }
    }
}

impl SignalEmitter for AudioEmitter {
    fn kind(&self) -> &'static str {
        "audio"
    }

    fn play(&self, tone: &ToneSpec) -> Result<(), SignalError> {
        let samples = tone.synthesize(SAMPLE_RATE);
        if samples.is_empty() || tone.gain <= 0.0 {
            return Ok(());
        }
        let tx = self
            .samples
            .lock()
            .map_err(|_| SignalError::Device("poisoned audio channel".into()))?;
        tx.send(samples)
            .map_err(|_| SignalError::Device("player thread exited".into()))
    }
}
