//! Tap-speed session.
//!
//! ```text
//! Idle -> Ready (3 lead-in ticks) -> Active (duration ticks) -> Finished -> Idle
//! ```
//!
//! Driven by one-second ticks from the controller. The session only counts;
//! ranking qualification happens in the controller once it sees
//! `TapFinished`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;

/// Poll period for the tap game.
pub const TAP_TICK_MS: u64 = 1000;

/// Lead-in beats before measurement starts.
pub const LEAD_IN_TICKS: u8 = 3;

/// Countdown cues fire while this many seconds or fewer remain.
pub const COUNTDOWN_SECONDS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapPhase {
    Idle,
    Ready,
    Active,
    Finished,
}

/// Supported round lengths. Each has its own ranking bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TapDuration {
    Three,
    Five,
    Ten,
    Thirty,
    Sixty,
}

impl TapDuration {
    pub const ALL: [TapDuration; 5] = [
        TapDuration::Three,
        TapDuration::Five,
        TapDuration::Ten,
        TapDuration::Thirty,
        TapDuration::Sixty,
    ];

    pub fn secs(self) -> u32 {
        match self {
            TapDuration::Three => 3,
            TapDuration::Five => 5,
            TapDuration::Ten => 10,
            TapDuration::Thirty => 30,
            TapDuration::Sixty => 60,
        }
    }
}

impl TryFrom<u32> for TapDuration {
    type Error = ValidationError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        TapDuration::ALL
            .into_iter()
            .find(|d| d.secs() == secs)
            .ok_or(ValidationError::TapDuration(secs))
    }
}

impl From<TapDuration> for u32 {
    fn from(duration: TapDuration) -> Self {
        duration.secs()
    }
}

impl fmt::Display for TapDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.secs())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapSession {
    phase: TapPhase,
    duration: TapDuration,
    lead_in: u8,
    remaining_seconds: u32,
    tap_count: u32,
}

impl TapSession {
    pub fn new(duration: TapDuration) -> Self {
        Self {
            phase: TapPhase::Idle,
            duration,
            lead_in: 0,
            remaining_seconds: duration.secs(),
            tap_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TapPhase {
        self.phase
    }

    pub fn duration(&self) -> TapDuration {
        self.duration
    }

    pub fn lead_in(&self) -> u8 {
        self.lead_in
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn tap_count(&self) -> u32 {
        self.tap_count
    }

    pub fn snapshot(&self) -> Event {
        Event::TapSnapshot {
            phase: self.phase,
            duration_secs: self.duration.secs(),
            lead_in: self.lead_in,
            remaining_secs: self.remaining_seconds,
            taps: self.tap_count,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the lead-in. The first beep belongs to this call.
    pub fn start(&mut self, duration: TapDuration) -> Event {
        self.duration = duration;
        self.tap_count = 0;
        self.lead_in = LEAD_IN_TICKS;
        self.remaining_seconds = duration.secs();
        self.phase = TapPhase::Ready;
        Event::TapLeadIn {
            count: LEAD_IN_TICKS,
        }
    }

    /// One-second tick.
    pub fn tick(&mut self) -> Option<Event> {
        match self.phase {
            TapPhase::Ready => {
                self.lead_in = self.lead_in.saturating_sub(1);
                if self.lead_in > 0 {
                    return Some(Event::TapLeadIn {
                        count: self.lead_in,
                    });
                }
                self.phase = TapPhase::Active;
                self.remaining_seconds = self.duration.secs();
                Some(Event::TapActive {
                    duration_secs: self.duration.secs(),
                })
            }
            TapPhase::Active => {
                self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
                if self.remaining_seconds == 0 {
                    self.phase = TapPhase::Finished;
                    return Some(Event::TapFinished {
                        duration_secs: self.duration.secs(),
                        taps: self.tap_count,
                    });
                }
                if self.remaining_seconds <= COUNTDOWN_SECONDS {
                    return Some(Event::TapCountdown {
                        remaining_secs: self.remaining_seconds,
                    });
                }
                None
            }
            TapPhase::Idle | TapPhase::Finished => None,
        }
    }

    /// Count one tap. Returns whether it counted.
    pub fn tap(&mut self) -> bool {
        if self.phase != TapPhase::Active {
            return false;
        }
        self.tap_count = self.tap_count.saturating_add(1);
        true
    }

    pub fn reset(&mut self) -> Event {
        self.phase = TapPhase::Idle;
        self.lead_in = 0;
        self.remaining_seconds = self.duration.secs();
        self.tap_count = 0;
        Event::TapReset
    }
}
