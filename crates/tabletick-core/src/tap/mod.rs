mod controller;
mod input;
mod session;

pub use controller::{RoundStatus, TapController};
pub use input::{HoldButton, HoldOutcome, PointerId, PointerTracker, RESET_HOLD_MS};
pub use session::{
    TapDuration, TapPhase, TapSession, COUNTDOWN_SECONDS, LEAD_IN_TICKS, TAP_TICK_MS,
};
