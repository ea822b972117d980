//! Detect-and-avoid engine capability interface
//!
//! The crate never implements conflict detection itself; it drives an
//! external engine through this narrow trait. Keeping the surface small
//! lets the hypothesis protocol be exercised against a fake in tests and
//! keeps the real engine an opaque collaborator.

use crate::error::EngineError;
use crate::geo::{GeodeticPoint, GroundVelocity};

use super::types::{ConflictTime, DirectionBands, HorizontalResolution, TrafficState};

/// Capability interface of an external detect-and-avoid engine.
///
/// The engine is a stateful working set of aircraft: the ownship at index 0
/// and intruders at 1..N. Indices are stable while an aircraft stays
/// tracked and are invalidated by removal or staleness.
pub trait DaaEngine {
    /// Add or replace the ownship state.
    ///
    /// Replacing the ownship resets the working set: previously added
    /// intruders are dropped and must be re-submitted against the new
    /// ownship state.
    fn set_ownship_state(
        &mut self,
        id: &str,
        position: GeodeticPoint,
        velocity: GroundVelocity,
        time: f64,
    ) -> Result<(), EngineError>;

    /// Add or replace an intruder state, returning its index.
    ///
    /// `time` defaults to the ownship time when `None`. Re-submitting an
    /// already-tracked id replaces its state and keeps its index.
    fn add_traffic_state(
        &mut self,
        id: &str,
        position: GeodeticPoint,
        velocity: GroundVelocity,
        time: Option<f64>,
    ) -> Result<usize, EngineError>;

    /// Index of a tracked aircraft by id, if currently tracked
    fn aircraft_index(&self, id: &str) -> Option<usize>;

    /// Number of tracked aircraft including the ownship
    fn aircraft_count(&self) -> usize;

    /// State read-back for snapshotting; index 0 is the ownship
    fn traffic_state(&self, index: usize) -> Option<TrafficState>;

    /// Whether the aircraft at this index is tracked and not stale
    fn is_valid(&self, index: usize) -> bool;

    /// Elapsed time until the intruder at `index` enters the corrective
    /// volume, or `Never`
    fn time_to_corrective_volume(&self, index: usize) -> Result<ConflictTime, EngineError>;

    /// Time to closest point of approach with the intruder at `index`,
    /// seconds (negative when the closest point is in the past)
    fn time_to_closest_approach(&self, index: usize) -> Result<f64, EngineError>;

    /// Horizontal-direction conflict bands for the current working set
    fn horizontal_direction_bands(&self) -> DirectionBands;

    /// Preferred conflict-free track, if the current track is in conflict
    /// and an escape exists
    fn horizontal_direction_resolution(&self) -> Option<HorizontalResolution>;

    /// Wind the traffic is blowing toward. Default: engine has no wind model.
    fn set_wind_velocity_to(&mut self, _velocity: GroundVelocity) {}

    /// Wind the traffic is blowing from. Default: engine has no wind model.
    fn set_wind_velocity_from(&mut self, _velocity: GroundVelocity) {}

    /// One-sigma horizontal position uncertainty, meters
    fn set_horizontal_position_uncertainty(&mut self, _sigma: f64) {}

    /// One-sigma vertical position uncertainty, meters
    fn set_vertical_position_uncertainty(&mut self, _sigma: f64) {}

    /// One-sigma horizontal velocity uncertainty, m/s
    fn set_horizontal_velocity_uncertainty(&mut self, _sigma: f64) {}

    /// One-sigma vertical speed uncertainty, m/s
    fn set_vertical_speed_uncertainty(&mut self, _sigma: f64) {}

    /// Prediction horizon in seconds
    fn set_lookahead_time(&mut self, _seconds: f64) {}

    /// Near-mid-air-collision thresholds, meters
    fn set_nmac_thresholds(&mut self, _horizontal: f64, _vertical: f64) {}
}
