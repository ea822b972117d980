//! Local azimuthal-equidistant projection
//!
//! Creates a Euclidean frame around a reference point. Geodetic positions
//! map to the plane by initial bearing and great-circle distance from the
//! reference, so distance and bearing *from the reference* are preserved
//! exactly, while separations perpendicular to that ray distort with range.
//! The projection is truncated to one hemisphere: a quarter of the earth's
//! circumference is the hard range limit.
//!
//! Instances are immutable after construction and freely shareable;
//! changing the reference means making a new instance.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Rotation2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::great_circle::{
    self, destination, distance, final_bearing, initial_bearing, EARTH_RADIUS_M,
};
use super::position::{GeodeticPoint, GroundVelocity};
use crate::error::ProjectionError;

/// Position in the projected frame: x east-ish, y north-ish along the
/// bearing basis at the reference, z up. Meters. Only meaningful relative
/// to the projection instance that produced it.
pub type LocalPoint = Vector3<f64>;

/// Velocity in the projected frame, m/s, same basis as [`LocalPoint`].
/// Paired with the position it was derived at.
pub type LocalVelocity = Vector3<f64>;

/// Local Euclidean projection anchored at a reference point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AziEquiProjection {
    reference: GeodeticPoint,
}

impl AziEquiProjection {
    /// Create a projection around the given reference point
    pub fn new(reference: GeodeticPoint) -> Self {
        AziEquiProjection { reference }
    }

    /// Return a new projection with a different reference point.
    ///
    /// The existing instance is untouched, so consumers holding it never
    /// observe the change.
    pub fn make_new(&self, reference: GeodeticPoint) -> Self {
        AziEquiProjection::new(reference)
    }

    /// The reference (tangent-plane origin) of this projection
    pub fn reference(&self) -> GeodeticPoint {
        self.reference
    }

    /// Maximum supported distance from the reference in meters.
    ///
    /// A quarter of the sphere's circumference; at and past this distance
    /// the truncated projection is singular.
    pub fn max_range(&self) -> f64 {
        FRAC_PI_2 * EARTH_RADIUS_M
    }

    /// Longest distance to a conflict this projection supports while keeping
    /// perpendicular-distance distortion within `accuracy` meters.
    ///
    /// The distortion of a perpendicular separation at range `d` scales as
    /// `(d/R)^2 / 6`; with the separation itself at the scale of the range
    /// the absolute error is `d^3 / (6 R^2)`, inverted here. On the
    /// spherical model the bound does not depend on latitude; the parameter
    /// is accepted for parity with latitude-sensitive projections.
    pub fn conflict_range(&self, _latitude: f64, accuracy: f64) -> f64 {
        if accuracy <= 0.0 {
            return 0.0;
        }
        (6.0 * EARTH_RADIUS_M * EARTH_RADIUS_M * accuracy)
            .cbrt()
            .min(self.max_range())
    }

    /// Project a geodetic point into the local frame.
    ///
    /// The point lands along its initial bearing from the reference at its
    /// great-circle distance; altitude maps linearly to z as the delta from
    /// the reference altitude. The reference itself maps to the local origin
    /// exactly (the degenerate bearing there is moot).
    pub fn project(&self, point: &GeodeticPoint) -> Result<LocalPoint, ProjectionError> {
        let d = distance(&self.reference, point);
        self.check_range(d)?;

        let z = point.alt() - self.reference.alt();
        if d == 0.0 {
            return Ok(Vector3::new(0.0, 0.0, z));
        }

        let bearing = initial_bearing(&self.reference, point);
        Ok(Vector3::new(d * bearing.sin(), d * bearing.cos(), z))
    }

    /// Recover the geodetic point for a local position.
    ///
    /// Algebraic inverse of [`project`](Self::project): bearing and distance
    /// are read back from (x, y) and the direct geodesic is applied from the
    /// reference.
    pub fn inverse(&self, local: &LocalPoint) -> Result<GeodeticPoint, ProjectionError> {
        let d = local.x.hypot(local.y);
        self.check_range(d)?;

        let alt = self.reference.alt() + local.z;
        if d == 0.0 {
            return Ok(self.reference.with_alt(alt));
        }

        let bearing = local.x.atan2(local.y);
        Ok(destination(&self.reference, bearing, d).with_alt(alt))
    }

    /// Project a ground velocity observed at `at` into the local frame.
    ///
    /// The horizontal components are rotated into the plane basis at the
    /// point's own bearing (correcting for meridian convergence along the
    /// arc), so the transform is valid anywhere in range, not just near the
    /// reference. The vertical rate is unchanged.
    pub fn project_velocity(
        &self,
        at: &GeodeticPoint,
        velocity: &GroundVelocity,
    ) -> Result<LocalVelocity, ProjectionError> {
        let d = distance(&self.reference, at);
        self.check_range(d)?;

        let skew = if d == 0.0 {
            0.0
        } else {
            self.basis_skew(at)
        };
        let horizontal = Rotation2::new(-skew) * Vector2::new(velocity.east, velocity.north);
        Ok(Vector3::new(horizontal.x, horizontal.y, velocity.climb))
    }

    /// Recover the ground velocity for a local velocity observed at the
    /// local position `at`
    pub fn inverse_velocity(
        &self,
        at: &LocalPoint,
        velocity: &LocalVelocity,
    ) -> Result<GroundVelocity, ProjectionError> {
        let d = at.x.hypot(at.y);
        self.check_range(d)?;

        let skew = if d == 0.0 {
            0.0
        } else {
            let bearing = at.x.atan2(at.y);
            let point = destination(&self.reference, bearing, d);
            great_circle::normalize_longitude(bearing - final_bearing(&self.reference, &point))
        };
        let horizontal = Rotation2::new(skew) * Vector2::new(velocity.x, velocity.y);
        Ok(GroundVelocity::new(horizontal.x, horizontal.y, velocity.z))
    }

    /// Angle between the plane bearing of a point's ray and the sphere
    /// bearing of the geodesic at that point
    fn basis_skew(&self, at: &GeodeticPoint) -> f64 {
        let outbound = initial_bearing(&self.reference, at);
        let arrival = final_bearing(&self.reference, at);
        great_circle::normalize_longitude(outbound - arrival)
    }

    fn check_range(&self, d: f64) -> Result<(), ProjectionError> {
        if d >= self.max_range() {
            Err(ProjectionError::OutOfRange {
                distance: d,
                max_range: self.max_range(),
            })
        } else {
            Ok(())
        }
    }
}
