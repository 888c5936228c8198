//! Monotonic and wall clocks.
//!
//! The engine never reads time on its own: every frame and timer callback is
//! handed a millisecond timestamp, and results are stamped through a
//! [`Clock`]. Front ends use [`SystemClock`]; tests drive a [`ManualClock`].

use core::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, TimeZone, Utc};

pub trait Clock: Send + Sync {
    /// Milliseconds on a monotonic timeline. Only differences are meaningful.
    fn uptime_ms(&self) -> u64;

    /// Wall-clock time for timestamps.
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn uptime_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now_ms: AtomicU64,
    epoch: DateTime<Utc>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(ms: u64) -> Self {
        let epoch = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            now_ms: AtomicU64::new(ms),
            epoch,
        }
    }

    pub fn advance(&self, ms: u64) -> u64 {
        self.now_ms.fetch_add(ms, Ordering::Relaxed) + ms
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::Relaxed);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Relaxed)
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.epoch + chrono::Duration::milliseconds(self.uptime_ms() as i64)
    }
}
