//! Geodetic coordinates and the local Euclidean projection
//!
//! This module provides the coordinate layer for conflict geometry:
//!
//! - **great_circle**: spherical distance, bearing and direct-geodesic
//!   primitives
//! - **position**: [`GeodeticPoint`] and [`GroundVelocity`] value types
//! - **projection**: [`AziEquiProjection`], the truncated
//!   azimuthal-equidistant projection used to carry positions and
//!   velocities into a frame where straight-line CPA math applies

pub mod great_circle;
pub mod position;
pub mod projection;

pub use great_circle::EARTH_RADIUS_M;
pub use position::{GeodeticPoint, GroundVelocity, KN_TO_MS, MS_TO_KN, NAUTICAL_MILE};
pub use projection::{AziEquiProjection, LocalPoint, LocalVelocity};
