//! DAA Type Definitions
//!
//! Traffic states, conflict timing results and band/resolution types shared
//! between the engine interface and the hypothesis evaluator.

use serde::{Deserialize, Serialize};

use crate::geo::{GeodeticPoint, GroundVelocity};

/// Time until a predicted event, with an explicit "never" sentinel.
///
/// Used for time-to-violation and for aggregate reductions. "Never" is a
/// distinct variant rather than a very large number, so it survives
/// serialization and arithmetic without overflow conventions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictTime {
    /// Event predicted this many seconds from the query time
    At(f64),
    /// No event predicted within the engine's lookahead
    Never,
}

impl ConflictTime {
    pub fn is_never(&self) -> bool {
        matches!(self, ConflictTime::Never)
    }

    /// Seconds until the event, if one is predicted
    pub fn seconds(&self) -> Option<f64> {
        match *self {
            ConflictTime::At(s) => Some(s),
            ConflictTime::Never => None,
        }
    }

    /// The sooner of two predictions; `Never` is later than everything
    pub fn earliest(self, other: Self) -> Self {
        match (self, other) {
            (ConflictTime::Never, b) => b,
            (a, ConflictTime::Never) => a,
            (ConflictTime::At(a), ConflictTime::At(b)) => ConflictTime::At(a.min(b)),
        }
    }
}

/// State of one tracked aircraft as held by the detection engine.
///
/// Snapshots compare field-for-field, which is what the transaction
/// restoration guarantee is stated in terms of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficState {
    /// Identifier, unique among currently tracked aircraft
    pub id: String,
    pub position: GeodeticPoint,
    pub velocity: GroundVelocity,
    /// State timestamp in seconds
    pub time: f64,
    /// Cleared when the state goes stale
    pub valid: bool,
}

impl TrafficState {
    pub fn new(
        id: impl Into<String>,
        position: GeodeticPoint,
        velocity: GroundVelocity,
        time: f64,
    ) -> Self {
        TrafficState {
            id: id.into(),
            position,
            velocity,
            time,
            valid: true,
        }
    }
}

/// Conflict timing for one intruder under a hypothetical ownship velocity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntruderOutcome {
    pub id: String,
    /// Engine index at query time (1..N; 0 is the ownship)
    pub index: usize,
    /// Time until entry into the corrective volume
    pub time_to_violation: ConflictTime,
    /// Time to closest point of approach in seconds
    pub time_to_closest_approach: f64,
}

/// Result of one hypothesis query. Ephemeral; recomputed per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisReport {
    /// The substitute ownship velocity that was evaluated
    pub velocity: GroundVelocity,
    pub intruders: Vec<IntruderOutcome>,
    /// Soonest predicted volume entry across all intruders
    pub earliest_violation: ConflictTime,
    /// Minimum time-to-closest-approach among intruders predicted to
    /// violate; `Never` when no intruder violates
    pub earliest_closest_approach: ConflictTime,
}

impl HypothesisReport {
    /// True when no intruder is predicted to enter the corrective volume
    pub fn is_clear(&self) -> bool {
        self.earliest_violation.is_never()
    }
}

/// Alerting region of a direction band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandRegion {
    /// No conflict predicted on these tracks
    Clear,
    Far,
    Mid,
    Near,
    /// Ownship already in violation; these tracks recover soonest
    Recovery,
}

/// One contiguous interval of track directions sharing a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionBand {
    pub region: BandRegion,
    /// Lower track bound, radians clockwise from north
    pub low: f64,
    /// Upper track bound, radians clockwise from north
    pub high: f64,
}

/// Recovery guidance attached to a band set when the ownship is already
/// inside a protected volume
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryInfo {
    /// Seconds until separation is regained on the recommended guidance
    pub time_to_recovery: f64,
    /// Horizontal separation the recovery aims to restore, meters
    pub horizontal_distance: f64,
    /// Vertical separation the recovery aims to restore, meters
    pub vertical_distance: f64,
}

/// Horizontal-direction conflict bands for the current traffic picture
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionBands {
    pub bands: Vec<DirectionBand>,
    pub recovery: Option<RecoveryInfo>,
}

/// Preferred turn direction for a horizontal resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

/// A conflict-free track recommendation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalResolution {
    pub direction: TurnDirection,
    /// Recommended track, radians clockwise from north
    pub track: f64,
}
