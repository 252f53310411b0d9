//! Engine operating-state classification
//!
//! Maps live sensor readings (RPM, throttle position, coolant temperature)
//! to exactly one of six mutually exclusive operating states. The
//! classifier exists primarily as a precondition for learning: the tweak
//! cycle must never adjust calibration cells while the engine is stopped
//! or being cranked, because lookups made then carry no usable signal.
//!
//! Classification is a pure function of the current readings plus the
//! previous state. The previous state only breaks the cranking/stopped
//! tie; callers own state persistence across samples.
//!
//! ## Decision policy (first match wins)
//!
//! 1. Below the running threshold, shaft turning from rest -> Cranking
//! 2. Below the running threshold otherwise -> NotRunning
//! 3. Throttle at or above wide-open -> WideOpen
//! 4. Coolant below the warm-up threshold -> Warm
//! 5. Throttle closed and RPM inside the idle band -> Idling
//! 6. Throttle closed, RPM above the idle band -> Coasting
//! 7. Fallback -> Idling
//!
//! WideOpen deliberately outranks Warm so full-throttle calibration
//! adjustments are not suppressed during warm-up; Warm outranks
//! Coasting/Idling so the tweak gate sees the thermal phase first.

use crate::constants::engine::{
    RUNNING_RPM_THRESHOLD,
    WIDE_OPEN_THROTTLE_PCT, IDLE_THROTTLE_PCT,
    NOMINAL_IDLE_RPM, IDLE_RPM_BAND,
    WARM_COOLANT_C,
};

/// Engine operating state
///
/// Closed enumeration; exactly one state is active at any instant. The
/// discriminants are the wire values shared with external tools and must
/// not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EngineState {
    /// Crankshaft stopped, or stalled below the running threshold
    NotRunning = 0,
    /// Starter motor turning the shaft below the running threshold
    Cranking = 1,
    /// Running, throttle closed, above the idle band
    Coasting = 2,
    /// Running, throttle closed, inside the idle band
    Idling = 3,
    /// Running at wide-open throttle
    WideOpen = 4,
    /// Running but not yet thermally stabilized
    Warm = 5,
}

impl EngineState {
    /// Numeric wire value of this state
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Decode a numeric wire value, rejecting anything outside 0..=5
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::NotRunning),
            1 => Some(Self::Cranking),
            2 => Some(Self::Coasting),
            3 => Some(Self::Idling),
            4 => Some(Self::WideOpen),
            5 => Some(Self::Warm),
            _ => None,
        }
    }

    /// True for states where combustion sustains rotation
    pub const fn is_running(self) -> bool {
        !matches!(self, Self::NotRunning | Self::Cranking)
    }

    /// True for states in which the tweak cycle may mutate the map
    ///
    /// Identical to [`is_running`](Self::is_running) today, but the gate
    /// is named separately because it is a policy, not a physical fact.
    pub const fn permits_adjustment(self) -> bool {
        self.is_running()
    }
}

/// Threshold-driven engine state classifier
///
/// All thresholds are injected at construction so tests and different
/// engine profiles can vary them without touching process-wide state.
#[derive(Debug, Clone)]
pub struct EngineStateClassifier {
    /// RPM at or above which the engine counts as running
    running_rpm: f32,
    /// Throttle percent at or above which the engine is wide open
    wide_open_pct: f32,
    /// Throttle percent at or below which the throttle is closed
    idle_pct: f32,
    /// Center of the idle RPM band
    idle_rpm: f32,
    /// Half-width of the idle RPM band
    idle_band: f32,
    /// Coolant temperature at or above which the engine is warm
    warm_coolant_c: f32,
}

impl Default for EngineStateClassifier {
    fn default() -> Self {
        Self {
            running_rpm: RUNNING_RPM_THRESHOLD as f32,
            wide_open_pct: WIDE_OPEN_THROTTLE_PCT,
            idle_pct: IDLE_THROTTLE_PCT,
            idle_rpm: NOMINAL_IDLE_RPM,
            idle_band: IDLE_RPM_BAND,
            warm_coolant_c: WARM_COOLANT_C,
        }
    }
}

impl EngineStateClassifier {
    /// Create a classifier with a custom idle profile
    ///
    /// High-compression or big-cam engines idle faster and rougher than
    /// the default 800 +/- 200 RPM band assumes.
    pub fn with_idle_profile(idle_rpm: f32, idle_band: f32) -> Self {
        Self {
            idle_rpm,
            idle_band: idle_band.abs(),
            ..Self::default()
        }
    }

    /// Override the warm-up coolant threshold
    pub fn with_warm_threshold(mut self, coolant_c: f32) -> Self {
        self.warm_coolant_c = coolant_c;
        self
    }

    /// Classify the current sensor readings into an operating state
    ///
    /// Inputs are required, finite real numbers: `rpm >= 0`,
    /// `throttle_pct` in 0..=100, `coolant_c` in calibrated units. The
    /// acquisition boundary rejects NaN/undefined readings before they
    /// get here.
    ///
    /// `previous` is only consulted to distinguish Cranking from
    /// NotRunning below the running threshold.
    pub fn classify(
        &self,
        rpm: f32,
        throttle_pct: f32,
        coolant_c: f32,
        previous: EngineState,
    ) -> EngineState {
        debug_assert!(rpm.is_finite() && throttle_pct.is_finite() && coolant_c.is_finite());

        // Threshold is inclusive-running: rpm == running_rpm is running.
        if rpm < self.running_rpm {
            // Shaft turning from rest means the starter is engaged. A
            // stall from a running state drops straight to NotRunning.
            return if rpm > 0.0 && !previous.is_running() {
                EngineState::Cranking
            } else {
                EngineState::NotRunning
            };
        }

        if throttle_pct >= self.wide_open_pct {
            return EngineState::WideOpen;
        }

        if coolant_c < self.warm_coolant_c {
            return EngineState::Warm;
        }

        let in_idle_band = (rpm - self.idle_rpm).abs() <= self.idle_band;
        if throttle_pct <= self.idle_pct && in_idle_band {
            return EngineState::Idling;
        }

        if throttle_pct <= self.idle_pct && rpm > self.idle_rpm + self.idle_band {
            return EngineState::Coasting;
        }

        EngineState::Idling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WARM: f32 = 90.0;
    const COLD: f32 = 20.0;

    #[test]
    fn stopped_engine_not_running() {
        let c = EngineStateClassifier::default();
        assert_eq!(c.classify(0.0, 0.0, COLD, EngineState::NotRunning), EngineState::NotRunning);
    }

    #[test]
    fn starter_spin_is_cranking() {
        let c = EngineStateClassifier::default();
        assert_eq!(c.classify(150.0, 0.0, COLD, EngineState::NotRunning), EngineState::Cranking);
        // Stays cranking while the starter keeps turning
        assert_eq!(c.classify(250.0, 0.0, COLD, EngineState::Cranking), EngineState::Cranking);
    }

    #[test]
    fn stall_drops_to_not_running() {
        let c = EngineStateClassifier::default();
        // Idling engine dies: rpm collapses below the threshold
        assert_eq!(c.classify(200.0, 0.0, WARM, EngineState::Idling), EngineState::NotRunning);
    }

    #[test]
    fn threshold_rpm_is_running() {
        let c = EngineStateClassifier::default();
        let state = c.classify(300.0, 2.0, WARM, EngineState::Cranking);
        assert!(state.is_running());
    }

    #[test]
    fn below_threshold_never_running_family() {
        let c = EngineStateClassifier::default();
        for rpm in [0.0, 1.0, 50.0, 299.0] {
            for prev in [
                EngineState::NotRunning,
                EngineState::Cranking,
                EngineState::Idling,
                EngineState::WideOpen,
            ] {
                let state = c.classify(rpm, 100.0, WARM, prev);
                assert!(
                    matches!(state, EngineState::NotRunning | EngineState::Cranking),
                    "rpm {rpm} prev {prev:?} gave {state:?}"
                );
            }
        }
    }

    #[test]
    fn wide_open_beats_warm() {
        let c = EngineStateClassifier::default();
        // Cold engine at full throttle: throttle state wins
        assert_eq!(c.classify(4000.0, 95.0, COLD, EngineState::Warm), EngineState::WideOpen);
    }

    #[test]
    fn idle_band_classification() {
        let c = EngineStateClassifier::default();
        assert_eq!(c.classify(800.0, 2.0, WARM, EngineState::Idling), EngineState::Idling);
        assert_eq!(c.classify(990.0, 2.0, WARM, EngineState::Idling), EngineState::Idling);
        // Above the band with a closed throttle: coasting
        assert_eq!(c.classify(2500.0, 2.0, WARM, EngineState::Idling), EngineState::Coasting);
    }

    #[test]
    fn cold_engine_is_warm_even_at_idle() {
        let c = EngineStateClassifier::default();
        assert_eq!(c.classify(2000.0, 30.0, COLD, EngineState::Idling), EngineState::Warm);
        // Warm outranks the idle band until the coolant comes up
        assert_eq!(c.classify(820.0, 2.0, COLD, EngineState::Cranking), EngineState::Warm);
    }

    #[test]
    fn part_throttle_cruise_falls_back_to_idling() {
        let c = EngineStateClassifier::default();
        assert_eq!(c.classify(2500.0, 30.0, WARM, EngineState::Warm), EngineState::Idling);
    }

    #[test]
    fn custom_idle_profile() {
        let c = EngineStateClassifier::with_idle_profile(1100.0, 150.0);
        assert_eq!(c.classify(1150.0, 2.0, WARM, EngineState::Idling), EngineState::Idling);
        // The default profile reads the same point as coasting
        let default = EngineStateClassifier::default();
        assert_eq!(default.classify(1150.0, 2.0, WARM, EngineState::Idling), EngineState::Coasting);
    }

    #[test]
    fn raw_round_trip() {
        for raw in 0..=5u8 {
            let state = EngineState::from_raw(raw).unwrap();
            assert_eq!(state.as_raw(), raw);
        }
        assert!(EngineState::from_raw(6).is_none());
    }

    #[test]
    fn adjustment_gate() {
        assert!(!EngineState::NotRunning.permits_adjustment());
        assert!(!EngineState::Cranking.permits_adjustment());
        assert!(EngineState::Coasting.permits_adjustment());
        assert!(EngineState::Idling.permits_adjustment());
        assert!(EngineState::WideOpen.permits_adjustment());
        assert!(EngineState::Warm.permits_adjustment());
    }
}
