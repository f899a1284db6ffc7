use std::io::Write;
use std::sync::Mutex;

use super::tone::ToneSpec;
use super::Cue;
use crate::error::SignalError;

/// Output device for cues.
///
/// Implementations may fail freely; [`super::Signals`] absorbs every error.
pub trait SignalEmitter: Send + Sync {
    /// Short name for logs.
    fn kind(&self) -> &'static str {
        "custom"
    }

    fn play(&self, tone: &ToneSpec) -> Result<(), SignalError>;

    fn vibrate(&self, _pattern_ms: &[u32]) -> Result<(), SignalError> {
        Err(SignalError::Unsupported("vibration"))
    }

    /// Hook for emitters that care which cue a tone belongs to.
    fn cue_started(&self, _cue: Cue) {}
}

/// Emitter that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentEmitter;

impl SignalEmitter for SilentEmitter {
    fn kind(&self) -> &'static str {
        "silent"
    }

    fn play(&self, _tone: &ToneSpec) -> Result<(), SignalError> {
        Ok(())
    }
}

/// Rings the terminal bell once per audible tone. Pitch and waveform are
/// lost; a muted tone rings nothing.
pub struct TerminalBell<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl TerminalBell<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> SignalEmitter for TerminalBell<W> {
    fn kind(&self) -> &'static str {
        "bell"
    }

    fn play(&self, tone: &ToneSpec) -> Result<(), SignalError> {
        if tone.gain <= 0.0 {
            return Ok(());
        }
        let mut out = self
            .out
            .lock()
            .map_err(|_| SignalError::Unsupported("poisoned terminal"))?;
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

/// Records every cue it is asked to produce.
#[derive(Debug, Default)]
pub struct CueRecorder {
    cues: Mutex<Vec<Cue>>,
    vibrations: Mutex<Vec<Vec<u32>>>,
}

impl CueRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn vibrations(&self) -> Vec<Vec<u32>> {
        self.vibrations.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.clear();
        }
        if let Ok(mut vibrations) = self.vibrations.lock() {
            vibrations.clear();
        }
    }
}

impl SignalEmitter for CueRecorder {
    fn kind(&self) -> &'static str {
        "recorder"
    }

    fn play(&self, _tone: &ToneSpec) -> Result<(), SignalError> {
        Ok(())
    }

    fn vibrate(&self, pattern_ms: &[u32]) -> Result<(), SignalError> {
        if let Ok(mut vibrations) = self.vibrations.lock() {
            vibrations.push(pattern_ms.to_vec());
        }
        Ok(())
    }

    fn cue_started(&self, cue: Cue) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue);
        }
    }
}

impl<E: SignalEmitter + ?Sized> SignalEmitter for std::sync::Arc<E> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn play(&self, tone: &ToneSpec) -> Result<(), SignalError> {
        (**self).play(tone)
    }

    fn vibrate(&self, pattern_ms: &[u32]) -> Result<(), SignalError> {
        (**self).vibrate(pattern_ms)
    }

    fn cue_started(&self, cue: Cue) {
        (**self).cue_started(cue)
    }
}
