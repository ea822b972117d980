//! Geodetic position and ground-velocity value types

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use super::great_circle::normalize_longitude;

/// Conversion constants
pub const NAUTICAL_MILE: f64 = 1852.0;
pub const KN_TO_MS: f64 = NAUTICAL_MILE / 3600.0;
pub const MS_TO_KN: f64 = 3600.0 / NAUTICAL_MILE;

/// A geodetic position: latitude/longitude in radians, altitude in meters.
///
/// The constructor keeps the canonical form: latitude clamped to
/// [-PI/2, PI/2], longitude normalized to (-PI, PI]. Two states captured
/// from the same source therefore compare equal field-for-field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeodeticPoint {
    lat: f64,
    lon: f64,
    alt: f64,
}

impl GeodeticPoint {
    /// Create a point from radians and meters, normalizing the angles
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        GeodeticPoint {
            lat: lat.clamp(-FRAC_PI_2, FRAC_PI_2),
            lon: normalize_longitude(lon),
            alt,
        }
    }

    /// Create a point from degrees and meters
    pub fn from_degrees(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }

    /// Latitude in radians
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in radians
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Altitude in meters
    pub fn alt(&self) -> f64 {
        self.alt
    }

    /// Latitude in degrees
    pub fn lat_degrees(&self) -> f64 {
        self.lat.to_degrees()
    }

    /// Longitude in degrees
    pub fn lon_degrees(&self) -> f64 {
        self.lon.to_degrees()
    }

    /// Same horizontal position at a different altitude
    pub fn with_alt(&self, alt: f64) -> Self {
        GeodeticPoint { alt, ..*self }
    }
}

/// Ground velocity at a geodetic position: east/north/climb in m/s.
///
/// The horizontal components are expressed in the local east-north frame at
/// the position the velocity was observed at; the pairing with that position
/// matters when transforming into a projected frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundVelocity {
    /// Eastward component in m/s
    pub east: f64,
    /// Northward component in m/s
    pub north: f64,
    /// Vertical rate in m/s, positive up
    pub climb: f64,
}

impl GroundVelocity {
    pub fn new(east: f64, north: f64, climb: f64) -> Self {
        GroundVelocity { east, north, climb }
    }

    /// Build from track angle (radians clockwise from north), ground speed
    /// and vertical rate in m/s
    pub fn from_track(track: f64, ground_speed: f64, climb: f64) -> Self {
        GroundVelocity {
            east: ground_speed * track.sin(),
            north: ground_speed * track.cos(),
            climb,
        }
    }

    /// Track angle in radians, [0, TAU), north = 0
    pub fn track(&self) -> f64 {
        let trk = self.east.atan2(self.north);
        if trk < 0.0 {
            trk + TAU
        } else {
            trk
        }
    }

    /// Horizontal speed in m/s
    pub fn ground_speed(&self) -> f64 {
        self.east.hypot(self.north)
    }

    /// Horizontal speed in knots
    pub fn ground_speed_knots(&self) -> f64 {
        self.ground_speed() * MS_TO_KN
    }

    /// Same ground speed and vertical rate on a substitute track
    pub fn with_track(&self, track: f64) -> Self {
        Self::from_track(track, self.ground_speed(), self.climb)
    }

    /// Same track and vertical rate at a substitute ground speed
    pub fn with_ground_speed(&self, ground_speed: f64) -> Self {
        Self::from_track(self.track(), ground_speed, self.climb)
    }

    /// Same horizontal velocity at a substitute vertical rate
    pub fn with_climb(&self, climb: f64) -> Self {
        GroundVelocity { climb, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_longitude_normalized_on_construction() {
        let p = GeodeticPoint::from_degrees(10.0, 190.0, 0.0);
        assert_relative_eq!(p.lon_degrees(), -170.0, epsilon = 1e-9);

        let q = GeodeticPoint::from_degrees(10.0, -180.0, 0.0);
        assert_relative_eq!(q.lon(), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_latitude_clamped() {
        let p = GeodeticPoint::from_degrees(95.0, 0.0, 0.0);
        assert_relative_eq!(p.lat_degrees(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_track_and_speed_roundtrip() {
        let v = GroundVelocity::from_track(1.2, 100.0, -2.5);
        assert_relative_eq!(v.track(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(v.ground_speed(), 100.0, epsilon = 1e-12);
        assert_relative_eq!(v.climb, -2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_with_track_keeps_speed() {
        let v = GroundVelocity::from_track(0.0, 200.0 * KN_TO_MS, 0.0);
        let turned = v.with_track(PI / 2.0);
        assert_relative_eq!(turned.ground_speed_knots(), 200.0, epsilon = 1e-9);
        assert_relative_eq!(turned.track(), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(turned.north, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_track_wraps_positive() {
        // Due west: east component negative
        let v = GroundVelocity::new(-10.0, 0.0, 0.0);
        assert_relative_eq!(v.track(), 1.5 * PI, epsilon = 1e-12);
    }
}
