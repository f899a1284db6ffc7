use serde::Serialize;

use super::{RankEntry, RankingBucket, RankingStore};
use crate::error::RankingError;
use crate::tap::TapDuration;

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub duration_secs: u32,
    pub entry: RankEntry,
    /// 1-based place on the reloaded board, if the entry shows up there.
    pub rank: Option<usize>,
    pub bucket: RankingBucket,
}

/// Sequences board reads and writes against one store.
pub struct RankingBoard<S: RankingStore> {
    store: S,
}

impl<S: RankingStore> RankingBoard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load(&self, duration: TapDuration) -> RankingBucket {
        self.store.load(duration)
    }

    pub fn qualifies(&self, duration: TapDuration, score: i64) -> bool {
        self.store.load(duration).qualifies(score)
    }

    /// Submit, wait for the store to settle, then read the board back.
    ///
    /// The reload never starts before the submit has completed.
    pub fn register(
        &self,
        duration: TapDuration,
        entry: RankEntry,
    ) -> Result<Registration, RankingError> {
        self.store.submit(duration, &entry)?;
        tracing::info!(
            backend = self.store.backend(),
            %duration,
            name = %entry.name,
            score = entry.score,
            "score registered"
        );

        let delay = self.store.settle_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let bucket = self.store.load(duration);
        Ok(Registration {
            duration_secs: duration.secs(),
            rank: bucket.rank_of(&entry),
            entry,
            bucket,
        })
    }

    pub fn clear(&self, duration: TapDuration) -> Result<(), RankingError> {
        self.store.clear(duration)
    }
}
