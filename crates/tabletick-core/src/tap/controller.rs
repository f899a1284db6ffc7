use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::input::{HoldButton, HoldOutcome, PointerId, PointerTracker};
use super::session::{TapDuration, TapPhase, TapSession, TAP_TICK_MS};
use crate::clock::{Clock, Ticker};
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::ranking::{RankEntry, RankingBoard, RankingStore, Registration};
use crate::signals::Signals;

/// Where a round stands with respect to the ranking board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Round not finished yet.
    Pending,
    /// Finished and good enough for the board; waiting for a name.
    Qualified,
    NotQualified,
    Registered { rank: Option<usize> },
}

/// Owns one tap session and everything that reacts to it.
pub struct TapController<C: Clock, S: RankingStore> {
    clock: C,
    ticker: Ticker,
    session: TapSession,
    pointers: PointerTracker,
    button: HoldButton,
    signals: Signals,
    board: RankingBoard<S>,
    status: RoundStatus,
}

impl<C: Clock, S: RankingStore> TapController<C, S> {
    pub fn new(clock: C, board: RankingBoard<S>, signals: Signals, duration: TapDuration) -> Self {
        Self {
            clock,
            ticker: Ticker::new(TAP_TICK_MS),
            session: TapSession::new(duration),
            pointers: PointerTracker::new(),
            button: HoldButton::new(),
            signals,
            board,
            status: RoundStatus::Pending,
        }
    }

    pub fn session(&self) -> &TapSession {
        &self.session
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn board(&self) -> &RankingBoard<S> {
        &self.board
    }

    /// Milliseconds until the next tick is due, if a round is running.
    pub fn until_next_tick(&self) -> Option<u64> {
        self.ticker.until_next(self.clock.now_ms())
    }

    pub fn start(&mut self, duration: TapDuration) -> Vec<Event> {
        self.pointers.clear();
        self.button.cancel();
        self.status = RoundStatus::Pending;
        let event = self.session.start(duration);
        self.ticker.start(self.clock.now_ms());
        self.emit(vec![event])
    }

    /// Run every tick that is due.
    pub fn poll(&mut self) -> Vec<Event> {
        let due = self.ticker.due_ticks(self.clock.now_ms());
        let mut events = Vec::new();
        for _ in 0..due {
            let Some(event) = self.session.tick() else {
                continue;
            };
            let finished = matches!(event, Event::TapFinished { .. });
            events.push(event);
            if finished {
                self.ticker.stop();
                events.push(self.evaluate());
                break;
            }
        }
        self.emit(events)
    }

    /// Keyboard-style tap with no pointer identity.
    pub fn tap(&mut self) -> bool {
        self.session.tap()
    }

    pub fn pointer_down(&mut self, id: PointerId) -> bool {
        self.pointers.down(id) && self.session.tap()
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        self.pointers.up(id);
    }

    pub fn pointer_cancel(&mut self, id: PointerId) {
        self.pointers.cancel(id);
    }

    pub fn press_control(&mut self) {
        self.button.press(self.clock.now_ms());
    }

    /// Short press taps, long press resets.
    pub fn release_control(&mut self) -> Vec<Event> {
        match self.button.release(self.clock.now_ms()) {
            Some(HoldOutcome::Hold) => vec![self.reset()],
            Some(HoldOutcome::Tap) => {
                self.tap();
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn reset(&mut self) -> Event {
        self.ticker.stop();
        self.pointers.clear();
        self.button.cancel();
        self.status = RoundStatus::Pending;
        self.session.reset()
    }

    /// Put the finished score on the board under `name`.
    ///
    /// On failure the round stays finished and qualified so the caller can
    /// retry with the same score.
    pub fn register(&mut self, name: &str) -> Result<Registration> {
        if self.session.phase() != TapPhase::Finished {
            return Err(ValidationError::InvalidState("round is not finished".into()).into());
        }
        match self.status {
            RoundStatus::Qualified => {}
            RoundStatus::Registered { .. } => {
                return Err(
                    ValidationError::InvalidState("score already registered".into()).into(),
                )
            }
            _ => {
                return Err(ValidationError::InvalidState(
                    "score does not qualify for the board".into(),
                )
                .into())
            }
        }

        let date = DateTime::<Utc>::from_timestamp_millis(self.clock.now_ms() as i64)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let entry = RankEntry::new(name, i64::from(self.session.tap_count()), date)?;
        let registration = self.board.register(self.session.duration(), entry)?;
        self.status = RoundStatus::Registered {
            rank: registration.rank,
        };
        Ok(registration)
    }

    /// Event describing a registration attempt.
    pub fn registration_event(&self, result: &Result<Registration>) -> Event {
        match result {
            Ok(reg) => Event::RankingRegistered {
                duration_secs: reg.duration_secs,
                name: reg.entry.name.clone(),
                score: self.session.tap_count(),
                rank: reg.rank,
            },
            Err(e) => Event::RankingRegistrationFailed {
                duration_secs: self.session.duration().secs(),
                message: failure_message(e),
            },
        }
    }

    fn evaluate(&mut self) -> Event {
        let duration = self.session.duration();
        let score = self.session.tap_count();
        let qualifies = self.board.qualifies(duration, i64::from(score));
        self.status = if qualifies {
            RoundStatus::Qualified
        } else {
            RoundStatus::NotQualified
        };
        Event::RankingEvaluated {
            duration_secs: duration.secs(),
            score,
            qualifies,
        }
    }

    fn emit(&self, events: Vec<Event>) -> Vec<Event> {
        self.signals.cue_events(&events);
        events
    }
}

fn failure_message(err: &CoreError) -> String {
    match err {
        CoreError::Ranking(e) => format!("Could not register your score ({e}). Please try again."),
        other => other.to_string(),
    }
}
