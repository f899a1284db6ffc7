use super::{RankEntry, RankingBucket, RankingStore};
use crate::error::{CoreError, DatabaseError, RankingError};
use crate::storage::Database;
use crate::tap::TapDuration;

/// Boards kept in the local kv store, one JSON array per duration.
pub struct LocalRankingStore {
    db: Database,
}

impl LocalRankingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn key(duration: TapDuration) -> String {
        format!("tap_rank_{}", duration.secs())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn save(&self, duration: TapDuration, bucket: &RankingBucket) -> Result<(), RankingError> {
        self.db
            .save_json(&Self::key(duration), bucket)
            .map_err(|e| match e {
                CoreError::Database(db) => RankingError::Storage(db),
                other => RankingError::Storage(DatabaseError::QueryFailed(other.to_string())),
            })
    }
}

impl RankingStore for LocalRankingStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    fn load(&self, duration: TapDuration) -> RankingBucket {
        let entries: Vec<RankEntry> = self.db.load_json_or_default(&Self::key(duration));
        RankingBucket::from_entries(entries)
    }

    fn submit(&self, duration: TapDuration, entry: &RankEntry) -> Result<(), RankingError> {
        let mut bucket = self.load(duration);
        bucket.submit(entry.clone());
        self.save(duration, &bucket)
    }

    fn clear(&self, duration: TapDuration) -> Result<(), RankingError> {
        // Write the empty array rather than deleting the key.
        self.save(duration, &RankingBucket::new())
    }
}
