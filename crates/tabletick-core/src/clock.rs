//! Time sources and fixed-period polling.
//!
//! Sessions never read the wall clock themselves. Controllers hold a
//! [`Clock`] and a [`Ticker`]; the ticker answers "how many periods have
//! elapsed since the last poll", which keeps the state machines
//! deterministic under a [`ManualClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Millisecond time source.
pub trait Clock: Send + Sync {
    /// Milliseconds since the clock's epoch.
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from the Unix epoch.
///
/// Deadlines are stored as epoch milliseconds so a running session can be
/// persisted by one CLI invocation and resumed by the next.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Fixed-period poll schedule.
///
/// Not a precise scheduler: it only counts whole periods that have passed.
/// Late polls catch up by reporting several due ticks at once.
#[derive(Debug, Clone)]
pub struct Ticker {
    period_ms: u64,
    next_due_ms: Option<u64>,
}

impl Ticker {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due_ms: None,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    /// Arm the ticker; the first tick is due one period after `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due_ms = Some(now_ms.saturating_add(self.period_ms));
    }

    pub fn stop(&mut self) {
        self.next_due_ms = None;
    }

    /// Number of ticks due at `now_ms`, consuming them.
    pub fn due_ticks(&mut self, now_ms: u64) -> u32 {
        let Some(next) = self.next_due_ms else {
            return 0;
        };
        if now_ms < next {
            return 0;
        }
        let due = (now_ms - next) / self.period_ms + 1;
        self.next_due_ms = Some(next + due * self.period_ms);
        due.min(u32::MAX as u64) as u32
    }

    /// Milliseconds until the next tick, if armed.
    pub fn until_next(&self, now_ms: u64) -> Option<u64> {
        self.next_due_ms.map(|next| next.saturating_sub(now_ms))
    }
}
