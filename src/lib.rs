//! # DAA Probe
//!
//! Geodetic projection and what-if conflict queries for detect-and-avoid
//! (DAA) engines.
//!
//! This crate contains pure coordinate and protocol logic with **zero I/O
//! dependencies**. It does not implement conflict detection itself; it
//! surrounds an external detect-and-avoid engine with the two pieces an
//! integration needs:
//!
//! - a local azimuthal-equidistant projection carrying geodetic positions
//!   and velocities into a Euclidean frame where straight-line
//!   closest-point-of-approach geometry applies, and
//! - a transactional "hypothesis" protocol that temporarily substitutes an
//!   ownship velocity, queries conflict timing for every tracked intruder,
//!   and restores the original traffic picture on every exit path.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  daa-probe (platform-independent, no tokio/async deps)      │
//! │  ├── geo/        (geodetic types, azimuthal-equidistant     │
//! │  │                projection, velocity transforms)          │
//! │  ├── daa/        (traffic states, DaaEngine trait,          │
//! │  │                hypothesis evaluator + transaction guard) │
//! │  └── emulator    (kinematic fake engine, feature-gated)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              ▲
//!                ┌─────────────┴─────────────┐
//!                │  external DAA engine      │
//!                │  (impl DaaEngine)         │
//!                └───────────────────────────┘
//! ```
//!
//! ## Invocation model
//!
//! Everything is synchronous and single-threaded: each operation runs to
//! completion before returning. Projections are immutable after
//! construction and freely shareable. Only one hypothesis transaction may
//! be open at a time; an overlapping query is rejected as a protocol error
//! rather than queued or interleaved.
//!
//! ## Example: projecting a position
//!
//! ```rust
//! use daa_probe::geo::{AziEquiProjection, GeodeticPoint};
//!
//! let proj = AziEquiProjection::new(GeodeticPoint::from_degrees(0.0, 0.0, 0.0));
//! let local = proj.project(&GeodeticPoint::from_degrees(0.0, 1.0, 0.0)).unwrap();
//! // One degree of longitude at the equator
//! assert!((local.x - 111_195.0).abs() < 1.0);
//! ```
//!
//! ## Example: a what-if query
//!
//! ```rust
//! # #[cfg(feature = "emulator")] {
//! use daa_probe::daa::{DaaEngine, HypothesisEvaluator};
//! use daa_probe::emulator::{EmulatorSettings, KinematicEngine};
//! use daa_probe::geo::{GeodeticPoint, GroundVelocity};
//!
//! let mut engine = KinematicEngine::new(EmulatorSettings::default());
//! engine.set_ownship_state(
//!     "ownship",
//!     GeodeticPoint::from_degrees(52.0, 4.0, 300.0),
//!     GroundVelocity::from_track(0.0, 100.0, 0.0),
//!     0.0,
//! ).unwrap();
//!
//! let evaluator = HypothesisEvaluator::new();
//! let report = evaluator
//!     .evaluate(&mut engine, GroundVelocity::from_track(1.0, 100.0, 0.0))
//!     .unwrap();
//! assert!(report.is_clear());
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `emulator` (default) - [`emulator::KinematicEngine`], a
//!   linear-extrapolation engine for tests and integration work

pub mod daa;
pub mod error;
pub mod geo;

#[cfg(feature = "emulator")]
pub mod emulator;

// Re-export commonly used types
pub use daa::{
    ConflictTime, DaaEngine, HypothesisEvaluator, HypothesisReport, HypothesisTransaction,
    IntruderOutcome, TrafficSnapshot, TrafficState,
};
pub use error::{EngineError, HypothesisError, ProjectionError};
pub use geo::{AziEquiProjection, GeodeticPoint, GroundVelocity, LocalPoint, LocalVelocity};
