use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tap::TapPhase;
use crate::turn::TurnPhase;

/// Every state change in the system produces an Event.
/// The CLI prints them; the signal layer maps them to cues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TurnStarted {
        player_index: usize,
        player: String,
        player_count: usize,
        seconds_per_turn: u32,
    },
    TurnAdvanced {
        player_index: usize,
        player: String,
        seconds_per_turn: u32,
    },
    /// Edge-triggered once per remaining second in the last five.
    TurnWarning {
        seconds_left: u64,
    },
    TurnOver {
        loser: String,
        players: Vec<String>,
        at: DateTime<Utc>,
    },
    TurnReset,
    TurnSnapshot {
        phase: TurnPhase,
        player_index: usize,
        player: Option<String>,
        players: Vec<String>,
        remaining_ms: u64,
        seconds_per_turn: u32,
        loser: Option<String>,
    },
    /// Lead-in beep; fires for 3, 2 and 1.
    TapLeadIn {
        count: u8,
    },
    TapActive {
        duration_secs: u32,
    },
    TapCountdown {
        remaining_secs: u32,
    },
    TapFinished {
        duration_secs: u32,
        taps: u32,
    },
    TapReset,
    TapSnapshot {
        phase: TapPhase,
        duration_secs: u32,
        lead_in: u8,
        remaining_secs: u32,
        taps: u32,
    },
    /// Result of checking a finished score against its ranking bucket.
    RankingEvaluated {
        duration_secs: u32,
        score: u32,
        qualifies: bool,
    },
    RankingRegistered {
        duration_secs: u32,
        name: String,
        score: u32,
        /// 1-based position after reload; `None` if the entry is not visible yet.
        rank: Option<usize>,
    },
    RankingRegistrationFailed {
        duration_secs: u32,
        message: String,
    },
}
