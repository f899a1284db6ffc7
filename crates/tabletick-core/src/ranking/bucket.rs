use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Entries kept per bucket.
pub const BUCKET_CAPACITY: usize = 5;

/// Longest name stored on the board, in characters.
pub const MAX_NAME_CHARS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub name: String,
    pub score: i64,
    /// ISO-8601 timestamp; compared as a plain string for tie-breaks.
    pub date: String,
}

impl RankEntry {
    /// Build an entry from user input. Trims and shortens the name.
    pub fn new(name: &str, score: i64, date: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "name must not be empty".into(),
            });
        }
        Ok(Self {
            name: trimmed.chars().take(MAX_NAME_CHARS).collect(),
            score,
            date: date.into(),
        })
    }
}

/// Board order: higher score first, then earlier date.
fn board_order(a: &RankEntry, b: &RankEntry) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.date.cmp(&b.date))
}

/// Top-5 list for one duration, always sorted and bounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankingBucket {
    entries: Vec<RankEntry>,
}

impl RankingBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort and truncate arbitrary entries into a bucket.
    pub fn from_entries(mut entries: Vec<RankEntry>) -> Self {
        entries.sort_by(board_order);
        entries.truncate(BUCKET_CAPACITY);
        Self { entries }
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= BUCKET_CAPACITY
    }

    /// Lowest score on a full board.
    pub fn cutoff(&self) -> Option<i64> {
        if self.is_full() {
            self.entries.last().map(|e| e.score)
        } else {
            None
        }
    }

    /// Whether `score` would earn a place. Ties with the last place do not.
    pub fn qualifies(&self, score: i64) -> bool {
        match self.cutoff() {
            None => true,
            Some(lowest) => score > lowest,
        }
    }

    /// Insert and re-rank. Returns the 1-based position of the new entry,
    /// or `None` if it fell off the board.
    pub fn submit(&mut self, entry: RankEntry) -> Option<usize> {
        self.entries.push(entry.clone());
        self.entries.sort_by(board_order);
        self.entries.truncate(BUCKET_CAPACITY);
        self.rank_of(&entry)
    }

    /// 1-based position of an entry equal to `entry`.
    pub fn rank_of(&self, entry: &RankEntry) -> Option<usize> {
        self.entries.iter().position(|e| e == entry).map(|i| i + 1)
    }

    pub fn into_entries(self) -> Vec<RankEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn entry(name: &str, score: i64, date: &str) -> RankEntry {
        RankEntry {
            name: name.into(),
            score,
            date: date.into(),
        }
    }

    fn full_bucket() -> RankingBucket {
        RankingBucket::from_entries(vec![
            entry("a", 50, "2024-01-01T00:00:00Z"),
            entry("b", 40, "2024-01-02T00:00:00Z"),
            entry("c", 30, "2024-01-03T00:00:00Z"),
            entry("d", 20, "2024-01-04T00:00:00Z"),
            entry("e", 10, "2024-01-05T00:00:00Z"),
        ])
    }

    #[test]
    fn new_entry_trims_and_shortens_name() {
        let e = RankEntry::new("   a-very-long-player-name  ", 3, "d").unwrap();
        assert_eq!(e.name, "a-very-long-play");
        assert!(RankEntry::new("   ", 3, "d").is_err());
    }

    #[test]
    fn full_bucket_cutoff_is_strict() {
        let bucket = full_bucket();
        assert_eq!(bucket.cutoff(), Some(10));
        assert!(!bucket.qualifies(10));
        assert!(bucket.qualifies(11));
        assert!(!bucket.qualifies(-1));
    }

    #[test]
    fn ties_broken_by_earlier_date() {
        let mut bucket = RankingBucket::new();
        bucket.submit(entry("late", 7, "2024-05-02T00:00:00Z"));
        let rank = bucket.submit(entry("early", 7, "2024-05-01T00:00:00Z"));
        assert_eq!(rank, Some(1));
        assert_eq!(bucket.entries()[0].name, "early");
    }

    #[test]
    fn submit_reports_dropped_entry() {
        let mut bucket = full_bucket();
        assert_eq!(bucket.submit(entry("low", 5, "2024-02-01T00:00:00Z")), None);
        assert_eq!(bucket.len(), BUCKET_CAPACITY);
        assert_eq!(bucket.submit(entry("top", 99, "2024-02-01T00:00:00Z")), Some(1));
        assert_eq!(bucket.entries().last().unwrap().score, 20);
    }

    fn arb_entry() -> impl Strategy<Value = RankEntry> {
        ("[a-z]{1,6}", -50i64..200, 0u32..30).prop_map(|(name, score, day)| RankEntry {
            name,
            score,
            date: format!("2024-03-{:02}T00:00:00Z", day + 1),
        })
    }

    proptest! {
        #[test]
        fn short_bucket_accepts_any_score(
            entries in prop::collection::vec(arb_entry(), 0..BUCKET_CAPACITY),
            score in any::<i64>(),
        ) {
            let bucket = RankingBucket::from_entries(entries);
            prop_assert!(bucket.qualifies(score));
        }

        #[test]
        fn submit_keeps_board_sorted_and_bounded(
            entries in prop::collection::vec(arb_entry(), 0..40),
        ) {
            let mut bucket = RankingBucket::new();
            for e in entries {
                bucket.submit(e);
                prop_assert!(bucket.len() <= BUCKET_CAPACITY);
            }
            for pair in bucket.entries().windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    prop_assert!(pair[0].date <= pair[1].date);
                }
            }
        }

        #[test]
        fn full_bucket_boundary(
            entries in prop::collection::vec(arb_entry(), BUCKET_CAPACITY..20),
        ) {
            let bucket = RankingBucket::from_entries(entries);
            let lowest = bucket.entries().last().map(|e| e.score).unwrap();
            prop_assert!(!bucket.qualifies(lowest));
            prop_assert!(bucket.qualifies(lowest + 1));
        }

        #[test]
        fn submit_keeps_best_scores(
            entries in prop::collection::vec(arb_entry(), 0..25),
        ) {
            let mut bucket = RankingBucket::new();
            for e in entries.iter().cloned() {
                bucket.submit(e);
            }
            let mut scores: Vec<i64> = entries.iter().map(|e| e.score).collect();
            scores.sort_unstable_by(|a, b| b.cmp(a));
            scores.truncate(BUCKET_CAPACITY);
            let kept: Vec<i64> = bucket.entries().iter().map(|e| e.score).collect();
            prop_assert_eq!(kept, scores);
        }
    }
}
