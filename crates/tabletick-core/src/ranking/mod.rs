//! Top-5 boards per tap duration.
//!
//! Ordering rules live in [`RankingBucket`]; the storage backends only move
//! buckets in and out, so both produce identically ordered boards.

mod board;
mod bucket;
mod local;
mod remote;

pub use board::{RankingBoard, Registration};
pub use bucket::{RankEntry, RankingBucket, BUCKET_CAPACITY, MAX_NAME_CHARS};
pub use local::LocalRankingStore;
pub use remote::{RemoteRankingStore, ScoreSubmission};

use std::time::Duration;

use crate::error::RankingError;
use crate::tap::TapDuration;

/// Storage for ranking buckets.
pub trait RankingStore {
    /// Short backend name for messages and logs.
    fn backend(&self) -> &'static str;

    /// Current board for a duration. Unavailable data yields an empty board.
    fn load(&self, duration: TapDuration) -> RankingBucket;

    fn submit(&self, duration: TapDuration, entry: &RankEntry) -> Result<(), RankingError>;

    /// Empty a board. After `Ok`, `load` observes an empty bucket.
    fn clear(&self, duration: TapDuration) -> Result<(), RankingError>;

    /// Wait between a successful submit and the read that follows it.
    fn settle_delay(&self) -> Duration {
        Duration::ZERO
    }
}

impl<S: RankingStore + ?Sized> RankingStore for Box<S> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn load(&self, duration: TapDuration) -> RankingBucket {
        (**self).load(duration)
    }

    fn submit(&self, duration: TapDuration, entry: &RankEntry) -> Result<(), RankingError> {
        (**self).submit(duration, entry)
    }

    fn clear(&self, duration: TapDuration) -> Result<(), RankingError> {
        (**self).clear(duration)
    }

    fn settle_delay(&self) -> Duration {
        (**self).settle_delay()
    }
}
