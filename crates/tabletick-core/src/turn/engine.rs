//! Turn clock implementation.
//!
//! The turn clock is a deadline-based state machine. It holds no timer of
//! its own: every command takes the current time and the caller polls
//! `tick()` every [`TURN_TICK_MS`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Running (advance) -> Over -> Idle
//!            \------------ reset -------------/
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = TurnSession::new(roster);
//! session.start(2, 15, clock.now_ms())?;
//! // Every 100 ms:
//! for event in session.tick(clock.now_ms()) { /* render, cue */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::storage::Database;

/// Poll period for the turn clock.
pub const TURN_TICK_MS: u64 = 100;

/// Warning cues fire for each remaining second in `1..=WARNING_SECONDS`.
pub const WARNING_SECONDS: u64 = 5;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// kv key holding the game between CLI invocations.
pub const SESSION_KEY: &str = "turn_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    Idle,
    Running,
    Over,
}

/// One game of the turn timer.
///
/// `deadline_ms` is `Some` exactly while the phase is `Running`.
/// Deserializing checks the table invariants, so a stored session that
/// breaks them is rejected rather than loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredTurnSession")]
pub struct TurnSession {
    roster: Vec<String>,
    player_count: usize,
    seconds_per_turn: u32,
    current_player_index: usize,
    phase: TurnPhase,
    deadline_ms: Option<u64>,
    /// Last second value a warning was emitted for in the current turn.
    last_warning_second: Option<u64>,
    loser: Option<String>,
}

#[derive(Deserialize)]
struct StoredTurnSession {
    roster: Vec<String>,
    player_count: usize,
    seconds_per_turn: u32,
    current_player_index: usize,
    phase: TurnPhase,
    #[serde(default)]
    deadline_ms: Option<u64>,
    #[serde(default)]
    last_warning_second: Option<u64>,
    #[serde(default)]
    loser: Option<String>,
}

impl TryFrom<StoredTurnSession> for TurnSession {
    type Error = ValidationError;

    fn try_from(stored: StoredTurnSession) -> Result<Self, Self::Error> {
        let session = Self {
            roster: stored.roster,
            player_count: stored.player_count,
            seconds_per_turn: stored.seconds_per_turn,
            current_player_index: stored.current_player_index,
            phase: stored.phase,
            deadline_ms: stored.deadline_ms,
            last_warning_second: stored.last_warning_second,
            loser: stored.loser,
        };
        session.validate()?;
        Ok(session)
    }
}

impl TurnSession {
    /// Create an idle session over the given player names.
    pub fn new(roster: Vec<String>) -> Self {
        Self {
            roster,
            player_count: MIN_PLAYERS,
            seconds_per_turn: 0,
            current_player_index: 0,
            phase: TurnPhase::Idle,
            deadline_ms: None,
            last_warning_second: None,
            loser: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn seconds_per_turn(&self) -> u32 {
        self.seconds_per_turn
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn loser(&self) -> Option<&str> {
        self.loser.as_deref()
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Names of the players taking part in this game.
    pub fn players(&self) -> &[String] {
        let end = self.player_count.min(self.roster.len());
        &self.roster[..end]
    }

    pub fn current_player(&self) -> Option<&str> {
        self.players()
            .get(self.current_player_index)
            .map(String::as_str)
    }

    /// Time left in the current turn; zero unless running.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match (self.phase, self.deadline_ms) {
            (TurnPhase::Running, Some(deadline)) => deadline.saturating_sub(now_ms),
            _ => 0,
        }
    }

    /// Check the invariants every command relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ValidationError::PlayerCount(self.player_count));
        }
        if self.current_player_index >= self.player_count {
            return Err(ValidationError::InvalidState(format!(
                "player index {} out of range for {} players",
                self.current_player_index, self.player_count
            )));
        }
        if (self.phase == TurnPhase::Running) != self.deadline_ms.is_some() {
            return Err(ValidationError::InvalidState(
                "deadline must be set exactly while a game is running".into(),
            ));
        }
        if self.phase != TurnPhase::Idle {
            if self.roster.len() < self.player_count {
                return Err(ValidationError::RosterTooShort {
                    requested: self.player_count,
                    available: self.roster.len(),
                });
            }
            if self.seconds_per_turn == 0 {
                return Err(ValidationError::ZeroTurnLength);
            }
        }
        Ok(())
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now_ms: u64) -> Event {
        Event::TurnSnapshot {
            phase: self.phase,
            player_index: self.current_player_index,
            player: self.current_player().map(str::to_string),
            players: self.players().to_vec(),
            remaining_ms: self.remaining_ms(now_ms),
            seconds_per_turn: self.seconds_per_turn,
            loser: self.loser.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a game. Restarts from any phase.
    pub fn start(
        &mut self,
        player_count: usize,
        seconds_per_turn: u32,
        now_ms: u64,
    ) -> Result<Event, ValidationError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(ValidationError::PlayerCount(player_count));
        }
        if self.roster.len() < player_count {
            return Err(ValidationError::RosterTooShort {
                requested: player_count,
                available: self.roster.len(),
            });
        }
        if seconds_per_turn == 0 {
            return Err(ValidationError::ZeroTurnLength);
        }

        self.player_count = player_count;
        self.seconds_per_turn = seconds_per_turn;
        self.current_player_index = 0;
        self.loser = None;
        self.phase = TurnPhase::Running;
        self.arm_deadline(now_ms);

        Ok(Event::TurnStarted {
            player_index: 0,
            player: self.current_player().unwrap_or_default().to_string(),
            player_count,
            seconds_per_turn,
        })
    }

    /// Pass the turn to the next player. No-op unless running.
    pub fn advance(&mut self, now_ms: u64) -> Option<Event> {
        if self.phase != TurnPhase::Running {
            return None;
        }
        self.current_player_index = (self.current_player_index + 1) % self.player_count;
        self.arm_deadline(now_ms);
        Some(Event::TurnAdvanced {
            player_index: self.current_player_index,
            player: self.current_player().unwrap_or_default().to_string(),
            seconds_per_turn: self.seconds_per_turn,
        })
    }

    /// Call every [`TURN_TICK_MS`]. Returns a warning while the last seconds
    /// run out and `TurnOver` when the deadline passes.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if self.phase != TurnPhase::Running {
            return None;
        }
        let remaining = self.remaining_ms(now_ms);
        if remaining == 0 {
            return Some(self.expire(now_ms));
        }

        let seconds_left = remaining.div_ceil(1000);
        if seconds_left <= WARNING_SECONDS && self.last_warning_second != Some(seconds_left) {
            self.last_warning_second = Some(seconds_left);
            return Some(Event::TurnWarning { seconds_left });
        }
        None
    }

    /// Drop back to idle from any phase.
    pub fn reset(&mut self) -> Event {
        self.phase = TurnPhase::Idle;
        self.current_player_index = 0;
        self.deadline_ms = None;
        self.last_warning_second = None;
        self.loser = None;
        Event::TurnReset
    }

    /// Replace the player names. Resets a game in progress.
    pub fn set_roster(&mut self, roster: Vec<String>) {
        self.roster = roster;
        self.reset();
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Load the stored game, or an idle one over `roster` when nothing
    /// valid is stored.
    pub fn load(db: &Database, roster: Vec<String>) -> Self {
        db.load_json_or_default::<Option<Self>>(SESSION_KEY)
            .unwrap_or_else(|| Self::new(roster))
    }

    pub fn save(&self, db: &Database) -> Result<(), CoreError> {
        db.save_json(SESSION_KEY, self)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm_deadline(&mut self, now_ms: u64) {
        let budget = u64::from(self.seconds_per_turn).saturating_mul(1000);
        self.deadline_ms = Some(now_ms.saturating_add(budget));
        self.last_warning_second = None;
    }

    fn expire(&mut self, now_ms: u64) -> Event {
        let loser = self.current_player().unwrap_or_default().to_string();
        self.phase = TurnPhase::Over;
        self.deadline_ms = None;
        self.last_warning_second = None;
        self.loser = Some(loser.clone());
        Event::TurnOver {
            loser,
            players: self.players().to_vec(),
            at: DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_default(),
        }
    }
}
