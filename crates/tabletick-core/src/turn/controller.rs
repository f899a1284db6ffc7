use super::engine::{TurnPhase, TurnSession, TURN_TICK_MS};
use super::history::{GameHistory, HistoryEntry};
use crate::clock::{Clock, Ticker};
use crate::error::ValidationError;
use crate::events::Event;
use crate::signals::Signals;
use crate::tap::{HoldButton, HoldOutcome};

/// Owns the turn session, its poll schedule and the game history.
pub struct TurnController<C: Clock> {
    clock: C,
    ticker: Ticker,
    session: TurnSession,
    button: HoldButton,
    signals: Signals,
    history: GameHistory,
}

impl<C: Clock> TurnController<C> {
    pub fn new(clock: C, session: TurnSession, signals: Signals, history: GameHistory) -> Self {
        let mut ticker = Ticker::new(TURN_TICK_MS);
        if session.phase() == TurnPhase::Running {
            ticker.start(clock.now_ms());
        }
        Self {
            clock,
            ticker,
            session,
            button: HoldButton::new(),
            signals,
            history,
        }
    }

    pub fn session(&self) -> &TurnSession {
        &self.session
    }

    pub fn history(&self) -> &GameHistory {
        &self.history
    }

    pub fn into_parts(self) -> (TurnSession, GameHistory) {
        (self.session, self.history)
    }

    pub fn remaining_ms(&self) -> u64 {
        self.session.remaining_ms(self.clock.now_ms())
    }

    pub fn snapshot(&self) -> Event {
        self.session.snapshot(self.clock.now_ms())
    }

    pub fn start(&mut self, player_count: usize, seconds_per_turn: u32) -> Result<Event, ValidationError> {
        let now = self.clock.now_ms();
        let event = self.session.start(player_count, seconds_per_turn, now)?;
        self.button.cancel();
        self.ticker.start(now);
        Ok(event)
    }

    /// Pass the turn on. A turn whose deadline has already passed ends the
    /// game instead, even if no poll has noticed yet.
    pub fn advance(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        if self.session.phase() == TurnPhase::Running && self.session.remaining_ms(now) == 0 {
            return self.tick_at(now).into_iter().next();
        }
        self.session.advance(now)
    }

    /// Evaluate the deadline if a tick is due.
    pub fn poll(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        if self.ticker.due_ticks(now) == 0 {
            return Vec::new();
        }
        self.tick_at(now)
    }

    /// Evaluate the deadline now, regardless of the poll schedule.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        self.tick_at(now)
    }

    pub fn reset(&mut self) -> Event {
        self.ticker.stop();
        self.button.cancel();
        self.session.reset()
    }

    pub fn press_control(&mut self) {
        self.button.press(self.clock.now_ms());
    }

    /// Short press passes the turn, long press resets.
    pub fn release_control(&mut self) -> Option<Event> {
        match self.button.release(self.clock.now_ms())? {
            HoldOutcome::Tap => self.advance(),
            HoldOutcome::Hold => Some(self.reset()),
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn tick_at(&mut self, now: u64) -> Vec<Event> {
        let Some(event) = self.session.tick(now) else {
            return Vec::new();
        };
        if let Event::TurnOver { loser, players, .. } = &event {
            self.ticker.stop();
            tracing::info!(%loser, "turn clock ran out");
            self.history.record(HistoryEntry {
                loser: loser.clone(),
                timestamp_ms: now as i64,
                players: players.clone(),
            });
        }
        let events = vec![event];
        self.signals.cue_events(&events);
        events
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::signals::{Cue, CueRecorder};
    use crate::storage::SignalsConfig;

    fn controller(clock: &ManualClock) -> (TurnController<ManualClock>, Arc<CueRecorder>) {
        let recorder = Arc::new(CueRecorder::new());
        let signals = Signals::new(Box::new(recorder.clone()), &SignalsConfig::default());
        let session = TurnSession::new(vec!["Alice".into(), "Bob".into(), "Carol".into()]);
        (
            TurnController::new(clock.clone(), session, signals, GameHistory::new()),
            recorder,
        )
    }

    fn run_for(ctl: &mut TurnController<ManualClock>, clock: &ManualClock, ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..(ms / TURN_TICK_MS) {
            clock.advance(TURN_TICK_MS);
            events.extend(ctl.poll());
        }
        events
    }

    #[test]
    fn countdown_cues_then_game_over() {
        let clock = ManualClock::new(0);
        let (mut ctl, recorder) = controller(&clock);
        ctl.start(2, 7).unwrap();
        run_for(&mut ctl, &clock, 7_000);

        let cues = recorder.cues();
        assert_eq!(cues.iter().filter(|c| **c == Cue::TurnWarning).count(), 5);
        assert_eq!(cues.last(), Some(&Cue::TurnOver));
        assert_eq!(ctl.session().phase(), TurnPhase::Over);
        assert_eq!(ctl.history().latest().unwrap().loser, "Alice");
        assert_eq!(ctl.history().latest().unwrap().timestamp_ms, 7_000);
    }

    #[test]
    fn no_polling_after_game_over() {
        let clock = ManualClock::new(0);
        let (mut ctl, _) = controller(&clock);
        ctl.start(2, 1).unwrap();
        run_for(&mut ctl, &clock, 1_000);
        assert!(run_for(&mut ctl, &clock, 2_000).is_empty());
        assert_eq!(ctl.history().len(), 1);
    }

    #[test]
    fn control_button_advances_or_resets() {
        let clock = ManualClock::new(0);
        let (mut ctl, _) = controller(&clock);
        ctl.start(3, 10).unwrap();

        ctl.press_control();
        clock.advance(100);
        assert!(matches!(
            ctl.release_control(),
            Some(Event::TurnAdvanced { player_index: 1, .. })
        ));

        ctl.press_control();
        clock.advance(700);
        assert_eq!(ctl.release_control(), Some(Event::TurnReset));
        assert_eq!(ctl.session().phase(), TurnPhase::Idle);
        assert!(ctl.history().is_empty());
    }

    #[test]
    fn late_advance_ends_game_instead_of_passing() {
        let clock = ManualClock::new(0);
        let (mut ctl, recorder) = controller(&clock);
        ctl.start(2, 3).unwrap();
        clock.advance(3_020);

        match ctl.advance() {
            Some(Event::TurnOver { loser, .. }) => assert_eq!(loser, "Alice"),
            other => panic!("Expected TurnOver, got {other:?}"),
        }
        assert_eq!(ctl.session().phase(), TurnPhase::Over);
        assert_eq!(ctl.history().latest().unwrap().loser, "Alice");
        assert_eq!(recorder.cues().last(), Some(&Cue::TurnOver));
        assert!(ctl.advance().is_none());
    }

    #[test]
    fn restored_running_session_keeps_polling() {
        let clock = ManualClock::new(50_000);
        let mut session = TurnSession::new(vec!["Alice".into(), "Bob".into()]);
        session.start(2, 3, 49_000).unwrap();
        let mut ctl = TurnController::new(
            clock.clone(),
            session,
            Signals::silent(),
            GameHistory::new(),
        );
        assert_eq!(ctl.remaining_ms(), 2_000);
        clock.advance(2_000);
        let events = ctl.tick();
        assert!(matches!(events.as_slice(), [Event::TurnOver { .. }]));
    }
}
