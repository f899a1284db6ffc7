//! Audible and haptic cues.
//!
//! Cues are best effort. Nothing here returns an error to the state
//! machines: a missing audio device or vibration motor only means the cue
//! is not heard.

#[cfg(feature = "audio")]
mod audio;
mod emitter;
mod tone;

#[cfg(feature = "audio")]
pub use audio::{AudioEmitter, SAMPLE_RATE};
pub use emitter::{CueRecorder, SignalEmitter, SilentEmitter, TerminalBell};
pub use tone::{ToneSpec, Waveform};

use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::storage::{SignalOutput, SignalsConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// One of the last five seconds of a turn.
    TurnWarning,
    /// A player ran out of time.
    TurnOver,
    /// Tap game lead-in beat.
    LeadIn,
    /// Tap measurement begins.
    Go,
    /// One of the last three seconds of a tap round.
    Countdown,
    /// Tap round ended.
    Finished,
}

impl Cue {
    pub fn tone(self) -> ToneSpec {
        match self {
            Cue::TurnWarning => ToneSpec::new(880.0, 80, Waveform::Square, 0.3),
            Cue::TurnOver => ToneSpec::new(220.0, 600, Waveform::Sawtooth, 0.5),
            Cue::LeadIn => ToneSpec::new(660.0, 100, Waveform::Sine, 0.4),
            Cue::Go => ToneSpec::new(1320.0, 150, Waveform::Sine, 0.5),
            Cue::Countdown => ToneSpec::new(880.0, 80, Waveform::Triangle, 0.4),
            Cue::Finished => ToneSpec::new(1320.0, 400, Waveform::Square, 0.4),
        }
    }

    /// Vibration on/off pattern in milliseconds.
    pub fn vibration(self) -> &'static [u32] {
        match self {
            Cue::TurnWarning | Cue::Countdown => &[40],
            Cue::LeadIn => &[60],
            Cue::Go => &[150],
            Cue::TurnOver => &[200, 100, 200],
            Cue::Finished => &[100, 50, 100],
        }
    }

    /// Which cue, if any, accompanies an event.
    pub fn for_event(event: &Event) -> Option<Cue> {
        match event {
            Event::TurnWarning { .. } => Some(Cue::TurnWarning),
            Event::TurnOver { .. } => Some(Cue::TurnOver),
            Event::TapLeadIn { .. } => Some(Cue::LeadIn),
            Event::TapActive { .. } => Some(Cue::Go),
            Event::TapCountdown { .. } => Some(Cue::Countdown),
            Event::TapFinished { .. } => Some(Cue::Finished),
            _ => None,
        }
    }
}

/// Build the emitter selected by `signals.output`.
///
/// Audio falls back to the terminal bell when no device opens or the
/// build has no audio support.
pub fn emitter_for(config: &SignalsConfig) -> Box<dyn SignalEmitter> {
    match config.output {
        SignalOutput::Silent => Box::new(SilentEmitter),
        SignalOutput::Bell => Box::new(TerminalBell::stderr()),
        SignalOutput::Audio => open_audio(),
    }
}

#[cfg(feature = "audio")]
fn open_audio() -> Box<dyn SignalEmitter> {
    match AudioEmitter::open() {
        Ok(emitter) => Box::new(emitter),
        Err(e) => {
            tracing::warn!(error = %e, "no audio output, using terminal bell");
            Box::new(TerminalBell::stderr())
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_audio() -> Box<dyn SignalEmitter> {
    tracing::warn!("built without audio support, using terminal bell");
    Box::new(TerminalBell::stderr())
}

/// Emitter plus the user's sound and vibration switches.
pub struct Signals {
    emitter: Box<dyn SignalEmitter>,
    sound: bool,
    vibration: bool,
    volume: u32,
}

impl Signals {
    pub fn new(emitter: Box<dyn SignalEmitter>, config: &SignalsConfig) -> Self {
        Self {
            emitter,
            sound: config.sound,
            vibration: config.vibration,
            volume: config.volume,
        }
    }

    /// Signals on the output named in config.
    pub fn from_config(config: &SignalsConfig) -> Self {
        let signals = Self::new(emitter_for(config), config);
        tracing::debug!(emitter = signals.emitter_kind(), "signals ready");
        signals
    }

    pub fn emitter_kind(&self) -> &'static str {
        self.emitter.kind()
    }

    pub fn silent() -> Self {
        Self {
            emitter: Box::new(SilentEmitter),
            sound: false,
            vibration: false,
            volume: 0,
        }
    }

    /// Fire a cue. Never fails.
    pub fn cue(&self, cue: Cue) {
        self.emitter.cue_started(cue);
        if self.sound {
            let tone = cue.tone().with_volume(self.volume);
            if let Err(e) = self.emitter.play(&tone) {
                tracing::debug!(?cue, error = %e, "sound cue dropped");
            }
        }
        if self.vibration {
            if let Err(e) = self.emitter.vibrate(cue.vibration()) {
                tracing::debug!(?cue, error = %e, "haptic cue dropped");
            }
        }
    }

    /// Fire the cue for each event that has one.
    pub fn cue_events<'a>(&self, events: impl IntoIterator<Item = &'a Event>) {
        for cue in events.into_iter().filter_map(Cue::for_event) {
            self.cue(cue);
        }
    }
}
