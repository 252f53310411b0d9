//! Time sources for the tweak cycle
//!
//! The tweak scheduler is phase-anchored to a monotonic timeline: ticks
//! fire relative to absolute due times, never relative to when the
//! previous tick finished, so tick-execution time cannot accumulate into
//! phase error. Wall-clock sources are deliberately absent — a clock
//! adjustment must not fire or suppress adjustment cycles.

/// Timestamp in milliseconds since device boot (monotonic)
pub type Timestamp = u64;

/// Source of monotonic time for the scheduler
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Get precision in milliseconds
    fn precision_ms(&self) -> u32 {
        1 // 1ms precision typical for most timers
    }
}

/// Monotonic clock backed by [`std::time::Instant`]
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Create a clock whose zero point is now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Create a fixed source reporting the given timestamp
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Set the reported timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the reported timestamp by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}
