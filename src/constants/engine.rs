//! Engine State Classification Thresholds
//!
//! Default thresholds used by [`crate::EngineStateClassifier`]. All of them
//! except [`RUNNING_RPM_THRESHOLD`] can be overridden per classifier
//! instance for engines with different idle or warm-up characteristics.

// ===== RUNNING DETECTION =====

/// Minimum RPM at which the engine counts as running (inclusive).
///
/// Below this the crankshaft is either stopped or being turned by the
/// starter motor; at or above it, combustion is sustaining rotation.
/// Part of the external compatibility surface.
pub const RUNNING_RPM_THRESHOLD: u32 = 300;

// ===== THROTTLE THRESHOLDS =====

/// Throttle position (percent) at or above which the engine is wide open.
///
/// Cable slack and sensor tolerance mean a floored pedal rarely reads a
/// full 100%.
pub const WIDE_OPEN_THROTTLE_PCT: f32 = 90.0;

/// Throttle position (percent) at or below which the throttle is closed.
pub const IDLE_THROTTLE_PCT: f32 = 5.0;

// ===== IDLE BAND =====

/// Nominal idle speed (RPM) for the default classifier.
pub const NOMINAL_IDLE_RPM: f32 = 800.0;

/// Half-width of the idle RPM band around [`NOMINAL_IDLE_RPM`].
///
/// Idle speed wanders with accessory load (alternator, A/C clutch), so
/// the band has to be generous enough not to chatter between states.
pub const IDLE_RPM_BAND: f32 = 200.0;

// ===== WARM-UP =====

/// Coolant temperature (degrees C) at or above which the engine is
/// thermally stabilized.
///
/// Thermostats typically start opening between 82 and 95 degrees C;
/// 70 leaves margin for the gauge sender sitting upstream of the stat.
pub const WARM_COOLANT_C: f32 = 70.0;
