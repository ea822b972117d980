//! Great-circle primitives on the spherical earth
//!
//! Distance, bearing and direct-geodesic solutions used by the local
//! projection. All angles are radians; distances are meters.

use std::f64::consts::{PI, TAU};

use super::position::GeodeticPoint;

/// Mean earth radius in meters (spherical model)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Normalize a longitude (or any angle) to (-PI, PI]
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

/// Great-circle distance between two points in meters.
///
/// Haversine form, which stays well-conditioned for nearby points.
pub fn distance(a: &GeodeticPoint, b: &GeodeticPoint) -> f64 {
    let dphi = b.lat() - a.lat();
    let dlambda = b.lon() - a.lon();
    let h = (dphi / 2.0).sin().powi(2)
        + a.lat().cos() * b.lat().cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial bearing of the great circle from `a` to `b`.
///
/// Radians clockwise from true north, in (-PI, PI]. Coincident points
/// resolve to bearing 0 rather than failing.
pub fn initial_bearing(a: &GeodeticPoint, b: &GeodeticPoint) -> f64 {
    let dlambda = b.lon() - a.lon();
    let x = dlambda.sin() * b.lat().cos();
    let y = a.lat().cos() * b.lat().sin() - a.lat().sin() * b.lat().cos() * dlambda.cos();
    x.atan2(y)
}

/// Bearing of the great circle from `a` to `b` on arrival at `b`.
///
/// Differs from the initial bearing by the convergence of meridians along
/// the arc.
pub fn final_bearing(a: &GeodeticPoint, b: &GeodeticPoint) -> f64 {
    normalize_longitude(initial_bearing(b, a) + PI)
}

/// Direct geodesic: the point `distance_m` meters from `from` along
/// `bearing` (radians clockwise from north).
///
/// Altitude is carried over unchanged; longitude is normalized to
/// (-PI, PI].
pub fn destination(from: &GeodeticPoint, bearing: f64, distance_m: f64) -> GeodeticPoint {
    if distance_m == 0.0 {
        return *from;
    }

    let sigma = distance_m / EARTH_RADIUS_M;
    let sin_lat = from.lat().sin();
    let cos_lat = from.lat().cos();
    let sin_sigma = sigma.sin();
    let cos_sigma = sigma.cos();

    let sin_lat2 = sin_lat * cos_sigma + cos_lat * sin_sigma * bearing.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing.sin() * sin_sigma * cos_lat;
    let x = cos_sigma - sin_lat * sin_lat2;
    let lon2 = from.lon() + y.atan2(x);

    GeodeticPoint::new(lat2, lon2, from.alt())
}
