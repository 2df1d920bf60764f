//! Time sources and tick pacing
//!
//! The flight loop runs on whatever clock the host provides. [`TickTimer`]
//! turns successive clock readings into the per-tick `dt` that the
//! quadcopter, autopilot and PID loops consume.

use core::sync::atomic::{AtomicU64, Ordering};

/// Monotonic clock for the flight loop.
///
/// # Example
///
/// ```
/// use quadpilot_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let start = time.now_us();
/// time.advance(20_000);
/// assert_eq!(time.elapsed_since(start), 20_000);
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns current time in milliseconds since start.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since start.
    fn now_us(&self) -> u64;

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Uses saturating subtraction to handle potential overflow.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Manually advanced clock.
///
/// Clones start from the same reading but advance independently.
#[derive(Default)]
pub struct MockTime {
    current_us: AtomicU64,
}

impl MockTime {
    pub fn new() -> Self {
        Self::with_initial(0)
    }

    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: AtomicU64::new(us),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.store(us, Ordering::Relaxed);
    }

    pub fn advance(&self, us: u64) {
        self.current_us.fetch_add(us, Ordering::Relaxed);
    }
}

impl Clone for MockTime {
    fn clone(&self) -> Self {
        Self::with_initial(self.now_us())
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Tick pacing
// ============================================================================

/// Longest step handed to the controllers after a stall
pub const MAX_TICK_S: f32 = 0.25;

/// Measures the time between flight-loop ticks
#[derive(Clone)]
pub struct TickTimer<T: TimeSource> {
    time: T,
    last_us: Option<u64>,
}

impl<T: TimeSource> TickTimer<T> {
    pub fn new(time: T) -> Self {
        Self {
            time,
            last_us: None,
        }
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    /// Seconds since the previous call, capped at [`MAX_TICK_S`].
    ///
    /// The first call returns zero.
    pub fn tick(&mut self) -> f32 {
        let now = self.time.now_us();
        let dt = match self.last_us {
            Some(last) => now.saturating_sub(last) as f32 / 1_000_000.0,
            None => 0.0,
        };
        self.last_us = Some(now);
        dt.min(MAX_TICK_S)
    }

    /// Forget the previous reading; the next `tick` returns zero.
    pub fn reset(&mut self) {
        self.last_us = None;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
