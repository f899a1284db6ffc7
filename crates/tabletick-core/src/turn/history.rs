//! Record of finished turn-timer games, newest first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Database;

/// Maximum number of games kept.
pub const HISTORY_CAPACITY: usize = 50;

const HISTORY_KEY: &str = "turn_history";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub loser: String,
    pub timestamp_ms: i64,
    pub players: Vec<String>,
}

/// Bounded newest-first list of games.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameHistory {
    entries: VecDeque<HistoryEntry>,
}

impl GameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a game, dropping the oldest beyond [`HISTORY_CAPACITY`].
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Load from the kv store; anything unreadable yields an empty history.
    pub fn load(db: &Database) -> Self {
        let mut history: Self = db.load_json_or_default(HISTORY_KEY);
        history.entries.truncate(HISTORY_CAPACITY);
        history
    }

    pub fn save(&self, db: &Database) -> Result<()> {
        db.save_json(HISTORY_KEY, self)
    }
}
