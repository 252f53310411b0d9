//! Constants for the calibration engine
//!
//! Centralized numeric parameters for the map, classifier, and tweak cycle.
//! The values in [`map`] and the tweak period in [`time`] form the external
//! compatibility surface: tables and controllers exchanged with other tools
//! assume exactly these bounds and sentinel, so they must not drift.
//!
//! ## Organization
//!
//! - **map**: grid dimension bounds, sentinel, valid calibration range
//! - **engine**: RPM/throttle/coolant thresholds for state classification
//! - **time**: tweak period, adjustment bound, unit conversions

/// Calibration map dimension bounds, sentinel, and value range.
pub mod map;

/// Engine state classification thresholds.
pub mod engine;

/// Tweak cycle timing and adjustment bounds.
pub mod time;

// Re-export commonly used constants for convenience
pub use map::{MIN_MAP_SIZE, MAX_MAP_SIZE, NIL_VALUE, CAL_VALUE_MIN, CAL_VALUE_MAX};
pub use engine::RUNNING_RPM_THRESHOLD;
pub use time::{TWEAK_PERIOD_MS, MAX_TWEAK_DELTA};
