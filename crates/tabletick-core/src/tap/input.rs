//! Raw input disambiguation shared by both games.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A press held at least this long on the shared control means "reset".
pub const RESET_HOLD_MS: u64 = 600;

pub type PointerId = u32;

/// Tracks which pointers are currently down so each press counts once.
///
/// A pointer that never reports `up` stays blocked until `cancel` or
/// `clear`; controllers clear the tracker on every start and reset.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    held: HashSet<PointerId>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this press should count.
    pub fn down(&mut self, id: PointerId) -> bool {
        self.held.insert(id)
    }

    pub fn up(&mut self, id: PointerId) {
        self.held.remove(&id);
    }

    /// Pointer capture lost or gesture aborted.
    pub fn cancel(&mut self, id: PointerId) {
        self.held.remove(&id);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn held(&self) -> usize {
        self.held.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldOutcome {
    /// Short press: the control's normal action.
    Tap,
    /// Sustained press: reset.
    Hold,
}

/// The overloaded control: short press acts, long press resets.
#[derive(Debug, Clone, Default)]
pub struct HoldButton {
    pressed_at_ms: Option<u64>,
}

impl HoldButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, now_ms: u64) {
        if self.pressed_at_ms.is_none() {
            self.pressed_at_ms = Some(now_ms);
        }
    }

    /// Resolve the press. `None` if the button was not pressed.
    pub fn release(&mut self, now_ms: u64) -> Option<HoldOutcome> {
        let pressed_at = self.pressed_at_ms.take()?;
        if now_ms.saturating_sub(pressed_at) >= RESET_HOLD_MS {
            Some(HoldOutcome::Hold)
        } else {
            Some(HoldOutcome::Tap)
        }
    }

    /// Drop an in-flight press without acting on it.
    pub fn cancel(&mut self) {
        self.pressed_at_ms = None;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at_ms.is_some()
    }

    /// How long the current press has lasted.
    pub fn held_for(&self, now_ms: u64) -> Option<u64> {
        self.pressed_at_ms.map(|at| now_ms.saturating_sub(at))
    }
}
