//! Periodic State-Gated Calibration Adjustment
//!
//! ## Overview
//!
//! Once per tweak period the scheduler takes the current engine state and
//! the window of recent lookups, and nudges each cell those lookups hit by
//! the mean correction observed there, bounded to a small per-tick delta.
//! The classifier exists for this gate: adjustments are applied only in
//! running states. NotRunning and Cranking lookups carry no combustion
//! signal and must never teach the map anything.
//!
//! ## Period enforcement
//!
//! The scheduler, not the caller, owns the period. Callers may invoke
//! [`TweakScheduler::tick`] as often as they like (every control-loop
//! iteration is typical); ticks before the next due time are reported as
//! [`TickOutcome::Pending`] and change nothing. Due times advance by whole
//! periods along the monotonic timeline rather than being recomputed from
//! each tick's completion, so tick-execution time cannot accumulate into
//! phase drift. After a long gap (engine off, scheduler paused) the
//! scheduler re-anchors to the present instead of bursting through the
//! missed periods: a learning loop must not fast-forward adjustments it
//! never observed lookups for.
//!
//! ## Shutdown
//!
//! [`TweakScheduler::shutdown`] stops the cycle: every later tick reports
//! [`TickOutcome::Stopped`] and leaves the map untouched. No tick is ever
//! left half-applied, because each cell adjustment is a single clamped
//! write and the window is consumed only after a tick commits to running.

use crate::{
    classifier::EngineState,
    constants::map::MAX_MAP_SIZE,
    constants::time::{TWEAK_PERIOD_MS, MAX_TWEAK_DELTA},
    history::LookupHistory,
    map::CalibrationMap,
    time::Timestamp,
};

/// What a tick did, for diagnostics and tests
///
/// The tweak loop never surfaces errors upward; a tick with nothing to do
/// reports why and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Scheduler has been shut down; no further ticks run
    Stopped,
    /// The tweak period has not elapsed yet
    Pending,
    /// Engine state excludes adjustment (NotRunning or Cranking)
    Gated,
    /// No lookups were recorded in the preceding period
    Empty,
    /// Adjustments were applied
    Applied {
        /// Number of cell adjustments written
        cells: usize,
    },
}

/// Fixed-interval driver for the calibration adjustment cycle
pub struct TweakScheduler {
    /// Interval between adjustment cycles, milliseconds
    period_ms: u64,
    /// Per-sample adjustment magnitude bound
    max_delta: f32,
    /// Next due time on the monotonic timeline; None until first tick
    next_due: Option<Timestamp>,
    /// Set by shutdown; never cleared
    stopped: bool,
}

impl TweakScheduler {
    /// Create a scheduler with the given period in milliseconds
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            max_delta: MAX_TWEAK_DELTA,
            next_due: None,
            stopped: false,
        }
    }

    /// Override the per-sample adjustment bound
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.abs();
        self
    }

    /// The configured period in milliseconds
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Run one scheduling step at monotonic time `now`
    ///
    /// Applies at most one adjustment pass per elapsed period. The window
    /// is aggregated per cell: each cell hit by at least one lookup moves
    /// by the mean correction observed there, clamped to the per-tick
    /// delta bound. The window is cleared afterwards so a burst of
    /// lookups is never applied twice.
    pub fn tick<const N: usize>(
        &mut self,
        now: Timestamp,
        state: EngineState,
        map: &mut CalibrationMap,
        history: &mut LookupHistory<N>,
    ) -> TickOutcome {
        if self.stopped {
            return TickOutcome::Stopped;
        }

        match self.next_due {
            None => {
                // First tick establishes phase; nothing has accumulated yet
                self.next_due = Some(now + self.period_ms);
                return TickOutcome::Pending;
            }
            Some(due) if now < due => return TickOutcome::Pending,
            Some(due) => {
                let next = due + self.period_ms;
                // Re-anchor after a gap instead of bursting catch-up ticks
                self.next_due = Some(if next <= now { now + self.period_ms } else { next });
            }
        }

        if !state.permits_adjustment() {
            // Gated ticks keep their phase but must not consume the
            // window: those lookups were made while not running.
            history.clear();
            return TickOutcome::Gated;
        }

        if history.is_empty() {
            return TickOutcome::Empty;
        }

        // Aggregate the window per cell so the per-tick bound holds per
        // cell regardless of how many lookups hit it: each cell moves by
        // at most max_delta per tick.
        let mut sum = [[0.0f32; MAX_MAP_SIZE]; MAX_MAP_SIZE];
        let mut count = [[0u32; MAX_MAP_SIZE]; MAX_MAP_SIZE];
        for sample in history.iter() {
            let (i, j) = map.nearest_cell(sample.rpm, sample.load);
            sum[i][j] += sample.correction;
            count[i][j] += 1;
        }
        history.clear();

        let mut cells = 0;
        for i in 0..map.rpm_len() {
            for j in 0..map.load_len() {
                if count[i][j] == 0 {
                    continue;
                }
                let mean = sum[i][j] / count[i][j] as f32;
                if map.adjust_cell(i, j, clamp_delta(mean, self.max_delta)) {
                    cells += 1;
                }
            }
        }

        TickOutcome::Applied { cells }
    }

    /// Request a clean stop; all further ticks are no-ops
    pub fn shutdown(&mut self) {
        self.stopped = true;
    }

    /// Whether the scheduler has been shut down
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Default for TweakScheduler {
    fn default() -> Self {
        Self::new(TWEAK_PERIOD_MS)
    }
}

fn clamp_delta(correction: f32, max_delta: f32) -> f32 {
    if correction > max_delta {
        max_delta
    } else if correction < -max_delta {
        -max_delta
    } else {
        correction
    }
}
