//! Calibration Map Constants
//!
//! Grid dimension bounds, the uncalibrated-cell sentinel, and the valid
//! calibration value range. These values are shared with external tuning
//! tools and calibration files and must be preserved exactly.

// ===== GRID DIMENSIONS =====

/// Minimum length of either map axis (RPM or load).
///
/// Below three breakpoints an axis cannot express a usable curve:
/// two intervals is the minimum for any non-linear shape.
pub const MIN_MAP_SIZE: usize = 3;

/// Maximum length of either map axis (RPM or load).
///
/// Caps the grid at 10x10 cells so the whole map fits in a few hundred
/// bytes and bracket search stays a trivially bounded scan.
pub const MAX_MAP_SIZE: usize = 10;

// ===== SENTINEL =====

/// Sentinel meaning "no valid calibration cell / uninitialized".
///
/// Appears only at the raw load/save boundary ([`crate::CalibrationMap::raw_cell`]
/// and [`crate::CalibrationMap::set_raw_cell`]); internally cells are an
/// explicit option. Legitimate calibration values are defined to be
/// strictly greater than this, so the sentinel can never collide.
pub const NIL_VALUE: i32 = -3000;

// ===== VALUE RANGE =====

/// Default lower bound for a stored calibration value.
///
/// Must stay above [`NIL_VALUE`] so a clamped value is never mistaken
/// for the sentinel.
pub const CAL_VALUE_MIN: f32 = -2000.0;

/// Default upper bound for a stored calibration value.
pub const CAL_VALUE_MAX: f32 = 2000.0;
