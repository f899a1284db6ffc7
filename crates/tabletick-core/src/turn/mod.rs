mod controller;
mod engine;
mod history;

pub use controller::TurnController;
pub use engine::{
    TurnPhase, TurnSession, MAX_PLAYERS, MIN_PLAYERS, SESSION_KEY, TURN_TICK_MS, WARNING_SECONDS,
};
pub use history::{GameHistory, HistoryEntry, HISTORY_CAPACITY};
