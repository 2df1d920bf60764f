//! Clocks for the host flight loop.
//!
//! A simulated clock is a shared atomic counter: clones share it, so the
//! loop driver can advance time while the flight controller's tick timer
//! reads it. A wall clock follows `std::time::Instant`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use quadpilot_core::traits::TimeSource;

#[derive(Debug, Clone)]
enum Source {
    Simulated(Arc<AtomicU64>),
    Wall(Instant),
}

/// Time source for SITL runs
#[derive(Debug, Clone)]
pub struct SitlClock {
    source: Source,
}

impl SitlClock {
    /// Simulated clock starting at zero.
    pub fn simulated() -> Self {
        Self {
            source: Source::Simulated(Arc::new(AtomicU64::new(0))),
        }
    }

    /// Real time, measured from now.
    pub fn wall() -> Self {
        Self {
            source: Source::Wall(Instant::now()),
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.source, Source::Simulated(_))
    }

    /// Advance simulated time. No effect on a wall clock.
    pub fn advance_us(&self, us: u64) {
        if let Source::Simulated(time_us) = &self.source {
            time_us.fetch_add(us, Ordering::Relaxed);
        }
    }

    /// Set simulated time to an absolute value. No effect on a wall clock.
    pub fn set_us(&self, us: u64) {
        if let Source::Simulated(time_us) = &self.source {
            time_us.store(us, Ordering::Relaxed);
        }
    }

    /// Wait one step: advances a simulated clock, sleeps on a wall clock.
    pub fn delay_us(&self, us: u64) {
        match &self.source {
            Source::Simulated(_) => self.advance_us(us),
            Source::Wall(_) => std::thread::sleep(std::time::Duration::from_micros(us)),
        }
    }
}

impl Default for SitlClock {
    fn default() -> Self {
        Self::simulated()
    }
}

impl TimeSource for SitlClock {
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    fn now_us(&self) -> u64 {
        match &self.source {
            Source::Simulated(time_us) => time_us.load(Ordering::Relaxed),
            Source::Wall(start) => start.elapsed().as_micros() as u64,
        }
    }
}
