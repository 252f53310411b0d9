//! Bounded 2-D Calibration Map with Interpolated Lookup
//!
//! ## Overview
//!
//! The calibration map is a small grid of cells indexed by RPM bucket and
//! load bucket. The control loop reads it continuously through
//! [`CalibrationMap::lookup`]; the tweak cycle nudges single cells through
//! [`CalibrationMap::adjust`]; calibration files flow through the raw cell
//! accessors. Axis lengths are bounded to 3..=10 breakpoints, so every
//! operation is a handful of array accesses with no allocation.
//!
//! ## Interpolation
//!
//! Lookups bracket the query on each axis and blend the four surrounding
//! cells bilinearly:
//!
//! ```text
//! Given four corners of a bracket:
//! f(0,0) = Q11, f(1,0) = Q21, f(0,1) = Q12, f(1,1) = Q22
//!
//! The interpolated value at (u,v) is:
//! f(u,v) = Q11(1-u)(1-v) + Q21·u(1-v) + Q12(1-u)v + Q22·uv
//! ```
//!
//! The result is exact at breakpoints, linear along a grid edge, and the
//! corner term corrects for the interaction between the two axes.
//!
//! ## Boundary policy
//!
//! Queries outside the axis range clamp to the nearest edge cell.
//! Extrapolation is disallowed outright: a runaway extrapolated value
//! would feed the actuator directly.
//!
//! ## Uncalibrated cells
//!
//! Cells start without a value and stay that way until a calibration is
//! loaded or the map is pre-filled. Internally that is an explicit
//! `Option`; the numeric sentinel ([`NIL_VALUE`]) exists only at the raw
//! load/save boundary for file compatibility. A lookup over a fully
//! uncalibrated bracket reports the sentinel; a partially calibrated
//! bracket borrows the nearest calibrated corner instead, so the sentinel
//! never bleeds into an otherwise valid interpolation.

use heapless::Vec;

use crate::{
    constants::map::{MIN_MAP_SIZE, MAX_MAP_SIZE, NIL_VALUE, CAL_VALUE_MIN, CAL_VALUE_MAX},
    errors::{MapError, MapResult},
};

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Bounded 2-D calibration table (RPM axis x load axis)
///
/// Owned exclusively by the controller. Mutation happens through the tweak
/// cycle's [`adjust`](Self::adjust) or an explicit calibration load;
/// the read path only ever borrows immutably. The crate follows a
/// single-writer model: serializing the one writer against readers (a
/// short lock around `adjust`, or a copy-on-write swap of the whole map)
/// is the embedding control loop's choice.
#[derive(Clone)]
pub struct CalibrationMap {
    /// RPM breakpoints, strictly increasing
    rpm_axis: Vec<f32, MAX_MAP_SIZE>,
    /// Load breakpoints, strictly increasing
    load_axis: Vec<f32, MAX_MAP_SIZE>,
    /// Cell storage, `cells[rpm_idx][load_idx]`; `None` = uncalibrated
    cells: [[Option<f32>; MAX_MAP_SIZE]; MAX_MAP_SIZE],
    /// Lower clamp bound for stored values
    value_min: f32,
    /// Upper clamp bound for stored values
    value_max: f32,
}

impl CalibrationMap {
    /// Create a map over the given axis breakpoints, all cells uncalibrated
    ///
    /// Each axis must have between [`MIN_MAP_SIZE`] and [`MAX_MAP_SIZE`]
    /// breakpoints (inclusive) and be strictly increasing.
    pub fn new(rpm_axis: &[f32], load_axis: &[f32]) -> MapResult<Self> {
        let rpm_axis = Self::check_axis("rpm", rpm_axis)?;
        let load_axis = Self::check_axis("load", load_axis)?;

        Ok(Self {
            rpm_axis,
            load_axis,
            cells: [[None; MAX_MAP_SIZE]; MAX_MAP_SIZE],
            value_min: CAL_VALUE_MIN,
            value_max: CAL_VALUE_MAX,
        })
    }

    /// Pre-fill every cell with a caller-supplied default value
    pub fn with_fill(mut self, value: f32) -> Self {
        let fill = clamp(value, self.value_min, self.value_max);
        for i in 0..self.rpm_len() {
            for j in 0..self.load_len() {
                self.cells[i][j] = Some(fill);
            }
        }
        self
    }

    /// Override the valid calibration value range
    ///
    /// The lower bound is kept strictly above the sentinel so a clamped
    /// value can never be mistaken for "no data".
    pub fn with_valid_range(mut self, min: f32, max: f32) -> Self {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        self.value_min = min.max(NIL_VALUE as f32 + 1.0);
        self.value_max = max;
        self
    }

    /// Length of the RPM axis
    pub fn rpm_len(&self) -> usize {
        self.rpm_axis.len()
    }

    /// Length of the load axis
    pub fn load_len(&self) -> usize {
        self.load_axis.len()
    }

    /// Interpolated lookup at the given operating point
    ///
    /// Returns `NIL_VALUE as f32` only when all four cells bracketing the
    /// query are uncalibrated; any calibrated corner makes the result
    /// finite. Out-of-range queries clamp to the table edge.
    pub fn lookup(&self, rpm: f32, load: f32) -> f32 {
        let (i, u, rpm_clamped) = bracket(&self.rpm_axis, rpm);
        let (j, v, load_clamped) = bracket(&self.load_axis, load);

        if rpm_clamped || load_clamped {
            log_warn!(
                "Calibration lookup clamped to table edge (rpm: {}, load: {})",
                rpm, load
            );
        }

        // Four corners of the bracket: q00 at (i,j), first index is RPM.
        let q00 = self.cells[i][j];
        let q10 = self.cells[i + 1][j];
        let q01 = self.cells[i][j + 1];
        let q11 = self.cells[i + 1][j + 1];

        if q00.is_none() && q10.is_none() && q01.is_none() && q11.is_none() {
            return NIL_VALUE as f32;
        }

        // Borrow the nearest calibrated corner for any uncalibrated one:
        // same row first, then same column, then the diagonal.
        let c00 = resolve(q00, q01, q10, q11);
        let c10 = resolve(q10, q11, q00, q01);
        let c01 = resolve(q01, q00, q11, q10);
        let c11 = resolve(q11, q10, q01, q00);

        // Bilinear blend with explicit corner term for the axis interaction
        c00 + (c10 - c00) * u + (c01 - c00) * v + (c11 - c10 - c01 + c00) * u * v
    }

    /// Add `delta` to the single cell nearest the given operating point
    ///
    /// The result is clamped to the valid calibration range, so repeated
    /// one-directional adjustment saturates instead of running away. An
    /// uncalibrated cell is left untouched: there is no base value to
    /// learn against, and the tweak cycle must not invent cells the
    /// calibration load never defined. Out-of-range coordinates resolve
    /// to the nearest edge cell.
    pub fn adjust(&mut self, rpm: f32, load: f32, delta: f32) {
        let (i, j) = self.nearest_cell(rpm, load);
        self.adjust_cell(i, j, delta);
    }

    /// Grid indices of the cell nearest the given operating point
    ///
    /// Out-of-range coordinates clamp to the nearest edge cell.
    pub fn nearest_cell(&self, rpm: f32, load: f32) -> (usize, usize) {
        (nearest(&self.rpm_axis, rpm), nearest(&self.load_axis, load))
    }

    /// Indexed variant of [`adjust`](Self::adjust) for the tweak cycle,
    /// which has already resolved cells. Returns whether a value was
    /// written (uncalibrated cells are skipped).
    pub(crate) fn adjust_cell(&mut self, i: usize, j: usize, delta: f32) -> bool {
        match self.cells[i][j] {
            Some(value) => {
                self.cells[i][j] = Some(clamp(value + delta, self.value_min, self.value_max));
                true
            }
            None => false,
        }
    }

    /// Raw indexed read for calibration save
    ///
    /// Uncalibrated cells read as `NIL_VALUE as f32`.
    pub fn raw_cell(&self, i: usize, j: usize) -> MapResult<f32> {
        self.check_index(i, j)?;
        Ok(self.cells[i][j].unwrap_or(NIL_VALUE as f32))
    }

    /// Raw indexed write for calibration load
    ///
    /// `NIL_VALUE as f32` marks the cell uncalibrated; any other value is
    /// clamped into the valid range so a loaded table always satisfies
    /// the cell invariant.
    pub fn set_raw_cell(&mut self, i: usize, j: usize, value: f32) -> MapResult<()> {
        self.check_index(i, j)?;
        self.cells[i][j] = if value == NIL_VALUE as f32 {
            None
        } else {
            Some(clamp(value, self.value_min, self.value_max))
        };
        Ok(())
    }

    fn check_axis(name: &'static str, axis: &[f32]) -> MapResult<Vec<f32, MAX_MAP_SIZE>> {
        if axis.len() < MIN_MAP_SIZE || axis.len() > MAX_MAP_SIZE {
            return Err(MapError::Configuration {
                axis: name,
                len: axis.len(),
                min: MIN_MAP_SIZE,
                max: MAX_MAP_SIZE,
            });
        }

        if axis.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MapError::NonMonotonicAxis { axis: name });
        }

        // Length is already checked against MAX_MAP_SIZE
        Ok(Vec::from_slice(axis).unwrap_or_default())
    }

    fn check_index(&self, i: usize, j: usize) -> MapResult<()> {
        if i >= self.rpm_len() {
            return Err(MapError::Index { index: i, len: self.rpm_len() });
        }
        if j >= self.load_len() {
            return Err(MapError::Index { index: j, len: self.load_len() });
        }
        Ok(())
    }
}

/// Locate the bracketing interval for `x` on a strictly increasing axis
///
/// Returns `(idx, frac, clamped)` where `axis[idx] <= x <= axis[idx+1]`
/// and `frac` is the normalized position inside that interval. Queries
/// outside the axis clamp to the first or last interval endpoint. The
/// scan is bounded by the maximum axis length.
fn bracket(axis: &[f32], x: f32) -> (usize, f32, bool) {
    let first = axis[0];
    let last = axis[axis.len() - 1];

    if x <= first {
        return (0, 0.0, x < first);
    }
    if x >= last {
        return (axis.len() - 2, 1.0, x > last);
    }

    let mut idx = 0;
    while idx + 2 < axis.len() && x >= axis[idx + 1] {
        idx += 1;
    }

    let span = axis[idx + 1] - axis[idx];
    let frac = (x - axis[idx]) / span;
    (idx, frac, false)
}

/// Index of the breakpoint nearest to `x`, clamped to the axis
fn nearest(axis: &[f32], x: f32) -> usize {
    let (idx, frac, _) = bracket(axis, x);
    idx + libm::roundf(frac) as usize
}

/// Substitute an uncalibrated corner with its nearest calibrated neighbor
///
/// Preference order: same row, same column, diagonal. The caller has
/// already ruled out the all-uncalibrated bracket, so one of the four is
/// always present.
fn resolve(corner: Option<f32>, row: Option<f32>, col: Option<f32>, diag: Option<f32>) -> f32 {
    corner
        .or(row)
        .or(col)
        .or(diag)
        .unwrap_or(NIL_VALUE as f32)
}

fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RPM_AXIS: [f32; 4] = [500.0, 1500.0, 3000.0, 6000.0];
    const LOAD_AXIS: [f32; 4] = [0.0, 25.0, 50.0, 100.0];

    fn filled_map(value: f32) -> CalibrationMap {
        CalibrationMap::new(&RPM_AXIS, &LOAD_AXIS).unwrap().with_fill(value)
    }

    #[test]
    fn construction_bounds() {
        assert!(CalibrationMap::new(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).is_ok());

        let too_short = CalibrationMap::new(&[1.0, 2.0], &LOAD_AXIS);
        assert!(matches!(too_short, Err(MapError::Configuration { axis: "rpm", len: 2, .. })));

        let eleven: [f32; 11] = core::array::from_fn(|i| i as f32);
        let too_long = CalibrationMap::new(&RPM_AXIS, &eleven);
        assert!(matches!(too_long, Err(MapError::Configuration { axis: "load", len: 11, .. })));
    }

    #[test]
    fn non_monotonic_axis_rejected() {
        let result = CalibrationMap::new(&[500.0, 500.0, 3000.0], &LOAD_AXIS);
        assert!(matches!(result, Err(MapError::NonMonotonicAxis { axis: "rpm" })));

        let result = CalibrationMap::new(&RPM_AXIS, &[0.0, 50.0, 25.0]);
        assert!(matches!(result, Err(MapError::NonMonotonicAxis { axis: "load" })));
    }

    #[test]
    fn lookup_exact_at_corners() {
        let mut map = filled_map(0.0);
        map.set_raw_cell(0, 0, 10.0).unwrap();
        map.set_raw_cell(3, 0, 20.0).unwrap();
        map.set_raw_cell(0, 3, 30.0).unwrap();
        map.set_raw_cell(3, 3, 40.0).unwrap();

        assert_eq!(map.lookup(500.0, 0.0), 10.0);
        assert_eq!(map.lookup(6000.0, 0.0), 20.0);
        assert_eq!(map.lookup(500.0, 100.0), 30.0);
        assert_eq!(map.lookup(6000.0, 100.0), 40.0);
    }

    #[test]
    fn lookup_midpoint_average_on_rpm_slice() {
        let mut map = filled_map(0.0);
        map.set_raw_cell(1, 1, 100.0).unwrap();
        map.set_raw_cell(2, 1, 200.0).unwrap();

        // Midpoint between the 1500 and 3000 RPM breakpoints at load 25
        assert_eq!(map.lookup(2250.0, 25.0), 150.0);
    }

    #[test]
    fn lookup_clamps_out_of_range_queries() {
        let mut map = filled_map(50.0);
        map.set_raw_cell(0, 0, 5.0).unwrap();
        map.set_raw_cell(3, 3, 95.0).unwrap();

        // Beyond the axis range on both sides: edge cell, no extrapolation
        assert_eq!(map.lookup(100.0, -10.0), 5.0);
        assert_eq!(map.lookup(9000.0, 150.0), 95.0);
    }

    #[test]
    fn fully_uncalibrated_bracket_reports_sentinel() {
        let map = CalibrationMap::new(&RPM_AXIS, &LOAD_AXIS).unwrap();
        assert_eq!(map.lookup(2000.0, 30.0), NIL_VALUE as f32);
    }

    #[test]
    fn partially_calibrated_bracket_never_reports_sentinel() {
        let mut map = CalibrationMap::new(&RPM_AXIS, &LOAD_AXIS).unwrap();
        map.set_raw_cell(1, 1, 80.0).unwrap();

        // One calibrated corner is enough for a finite result
        let value = map.lookup(2000.0, 30.0);
        assert!(value.is_finite());
        assert_ne!(value, NIL_VALUE as f32);
        assert_eq!(value, 80.0);
    }

    #[test]
    fn adjust_hits_nearest_cell_only() {
        let mut map = filled_map(100.0);

        // Bucket (2, 2) centers at 3000 RPM, 50% load
        map.adjust(3000.0, 50.0, 5.0);

        assert_eq!(map.lookup(3000.0, 50.0), 105.0);
        assert_eq!(map.raw_cell(2, 2).unwrap(), 105.0);
        // Neighbors untouched
        assert_eq!(map.raw_cell(1, 2).unwrap(), 100.0);
        assert_eq!(map.raw_cell(2, 1).unwrap(), 100.0);
        assert_eq!(map.raw_cell(3, 3).unwrap(), 100.0);
    }

    #[test]
    fn adjust_rounds_to_nearest_breakpoint() {
        let mut map = filled_map(0.0);

        // 2900 RPM is closer to 3000 than to 1500
        map.adjust(2900.0, 50.0, 7.0);
        assert_eq!(map.raw_cell(2, 2).unwrap(), 7.0);
        assert_eq!(map.raw_cell(1, 2).unwrap(), 0.0);
    }

    #[test]
    fn adjust_skips_uncalibrated_cells() {
        let mut map = CalibrationMap::new(&RPM_AXIS, &LOAD_AXIS).unwrap();
        map.adjust(3000.0, 50.0, 5.0);
        assert_eq!(map.raw_cell(2, 2).unwrap(), NIL_VALUE as f32);
    }

    #[test]
    fn raw_cell_index_errors() {
        let map = CalibrationMap::new(&RPM_AXIS, &LOAD_AXIS).unwrap();
        assert!(matches!(map.raw_cell(4, 0), Err(MapError::Index { index: 4, len: 4 })));
        assert!(matches!(map.raw_cell(0, 9), Err(MapError::Index { index: 9, len: 4 })));

        let mut map = map;
        assert!(map.set_raw_cell(4, 0, 1.0).is_err());
    }

    #[test]
    fn raw_sentinel_round_trip() {
        let mut map = filled_map(42.0);
        map.set_raw_cell(1, 1, NIL_VALUE as f32).unwrap();
        assert_eq!(map.raw_cell(1, 1).unwrap(), NIL_VALUE as f32);

        map.set_raw_cell(1, 1, 42.0).unwrap();
        assert_eq!(map.raw_cell(1, 1).unwrap(), 42.0);
    }

    #[test]
    fn loaded_values_clamped_into_valid_range() {
        let mut map = filled_map(0.0).with_valid_range(-100.0, 100.0);
        map.set_raw_cell(0, 0, 5000.0).unwrap();
        assert_eq!(map.raw_cell(0, 0).unwrap(), 100.0);
    }

    proptest! {
        #[test]
        fn construction_succeeds_exactly_in_bounds(rpm_len in 1usize..=16, load_len in 1usize..=16) {
            let rpm: std::vec::Vec<f32> = (0..rpm_len).map(|i| i as f32 * 100.0).collect();
            let load: std::vec::Vec<f32> = (0..load_len).map(|i| i as f32 * 10.0).collect();

            let result = CalibrationMap::new(&rpm, &load);
            let in_bounds = (MIN_MAP_SIZE..=MAX_MAP_SIZE).contains(&rpm_len)
                && (MIN_MAP_SIZE..=MAX_MAP_SIZE).contains(&load_len);

            prop_assert_eq!(result.is_ok(), in_bounds);
        }

        #[test]
        fn iterated_adjust_never_escapes_valid_range(
            delta in -10.0f32..10.0,
            iterations in 1usize..500,
        ) {
            let mut map = filled_map(0.0).with_valid_range(-100.0, 100.0);

            for _ in 0..iterations {
                map.adjust(3000.0, 50.0, delta);
            }

            let value = map.raw_cell(2, 2).unwrap();
            prop_assert!((-100.0..=100.0).contains(&value));
        }

        #[test]
        fn lookup_stays_within_corner_envelope(
            rpm in 500.0f32..6000.0,
            load in 0.0f32..100.0,
            a in -50.0f32..50.0,
            b in -50.0f32..50.0,
        ) {
            let mut map = filled_map(a);
            map.set_raw_cell(1, 1, b).unwrap();
            map.set_raw_cell(2, 2, b).unwrap();

            let value = map.lookup(rpm, load);
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(value >= lo - 1e-3 && value <= hi + 1e-3);
        }
    }
}
