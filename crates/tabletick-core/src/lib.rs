//! # TableTick Core Library
//!
//! Core logic for two small table-side games:
//!
//! - a **turn clock** for a stacking-block game: each player has a fixed
//!   budget per turn and whoever runs out of time loses;
//! - a **tap game**: count taps over 3, 5, 10, 30 or 60 seconds and keep a
//!   top-5 board per duration.
//!
//! The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Sessions**: `TurnSession` and `TapSession` are plain state machines
//!   that take the current time (or a tick) as input and return events
//! - **Controllers**: own a session, a [`Ticker`] over an injectable
//!   [`Clock`], the cue output and the persistence the session feeds
//! - **Signals**: best-effort sound and vibration cues
//! - **Ranking**: top-5 buckets over a local (SQLite kv) or remote (HTTP)
//!   store
//! - **Storage**: SQLite kv table and TOML configuration
//!
//! ## Key Components
//!
//! - [`TurnController`]: turn clock driver and game history
//! - [`TapController`]: tap round driver and ranking registration
//! - [`RankingStore`]: trait over the two board backends
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod ranking;
pub mod signals;
pub mod storage;
pub mod tap;
pub mod turn;

pub use clock::{Clock, ManualClock, SystemClock, Ticker};
pub use error::{ConfigError, CoreError, DatabaseError, RankingError, SignalError, ValidationError};
pub use events::Event;
pub use ranking::{
    LocalRankingStore, RankEntry, RankingBoard, RankingBucket, RankingStore, RemoteRankingStore,
};
pub use signals::{Cue, SignalEmitter, Signals};
pub use storage::{Config, Database};
pub use tap::{TapController, TapDuration, TapPhase, TapSession};
pub use turn::{GameHistory, HistoryEntry, TurnController, TurnPhase, TurnSession};
