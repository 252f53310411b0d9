//! Tweak Cycle Timing Constants
//!
//! Timing parameters for the periodic calibration adjustment loop and the
//! unit conversions the crate needs.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== TWEAK CYCLE =====

/// Fixed wall-clock interval between calibration adjustment cycles
/// (milliseconds).
///
/// 4 Hz is fast enough to track slow drift (fuel quality, air density)
/// while staying far below the control-loop rate, so the read path
/// dominates. Part of the external compatibility surface.
pub const TWEAK_PERIOD_MS: u64 = 250;

/// Maximum magnitude a single tweak tick may add to one cell.
///
/// Bounds the learning rate: with clamping to the valid calibration
/// range, no single tick can move a cell out of range or oscillate it
/// across the table.
pub const MAX_TWEAK_DELTA: f32 = 2.0;
