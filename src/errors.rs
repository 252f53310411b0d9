//! Error Types for Calibration Map Operations
//!
//! ## Design Philosophy
//!
//! The error set is deliberately tiny and built for embedded use:
//!
//! 1. **Small Size**: Variants carry only the indices/bounds needed to act
//!    on the failure, all inline, no heap allocation.
//!
//! 2. **Copy Semantics**: Errors implement Copy so they can be returned
//!    from hot paths and stored without move complications.
//!
//! 3. **Construction-time only**: the lookup, classify, adjust, and tick
//!    paths are total over their domains — out-of-range numeric inputs are
//!    clamped, never rejected. Only constructing a map with bad dimensions
//!    or raw-indexing outside the grid can fail.
//!
//! The "no data" sentinel returned by lookups over fully uncalibrated
//! regions is an expected value the caller checks for, not an error: the
//! actuator stage falls back to a conservative default instead of
//! treating a missing calibration as a crash condition.

use thiserror_no_std::Error;

/// Result type for calibration map operations
pub type MapResult<T> = Result<T, MapError>;

/// Calibration map errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// Map axis length outside the allowed dimension bounds.
    /// Fatal to that map instance.
    #[error("Axis {axis} length {len} outside [{min}, {max}]")]
    Configuration {
        /// Which axis failed ("rpm" or "load")
        axis: &'static str,
        /// The offending axis length
        len: usize,
        /// Minimum allowed axis length
        min: usize,
        /// Maximum allowed axis length
        max: usize,
    },

    /// Axis breakpoints not strictly increasing - the bracket search
    /// requires a sorted axis. Fatal to that map instance.
    #[error("Axis {axis} breakpoints not strictly increasing")]
    NonMonotonicAxis {
        /// Which axis failed ("rpm" or "load")
        axis: &'static str,
    },

    /// Raw cell index outside the grid - programmer error, propagated
    #[error("Index {index} outside [0, {len})")]
    Index {
        /// The offending index
        index: usize,
        /// Length of the indexed axis
        len: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for MapError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Configuration { axis, len, min, max } =>
                defmt::write!(fmt, "Axis {} length {} outside [{}, {}]", axis, len, min, max),
            Self::NonMonotonicAxis { axis } =>
                defmt::write!(fmt, "Axis {} breakpoints not strictly increasing", axis),
            Self::Index { index, len } =>
                defmt::write!(fmt, "Index {} outside [0, {})", index, len),
        }
    }
}
