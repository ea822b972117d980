//! Hypothesis queries against a detect-and-avoid engine
//!
//! This module holds the traffic-side of the crate:
//!
//! - **types**: traffic states, conflict timing with an explicit "never"
//!   sentinel, band and resolution types
//! - **engine**: [`DaaEngine`], the capability interface of the external
//!   detection engine
//! - **evaluator**: [`HypothesisEvaluator`], the transactional what-if
//!   query protocol

pub mod engine;
pub mod evaluator;
pub mod types;

pub use engine::DaaEngine;
pub use evaluator::{HypothesisEvaluator, HypothesisTransaction, TrafficSnapshot};
pub use types::{
    BandRegion, ConflictTime, DirectionBand, DirectionBands, HorizontalResolution,
    HypothesisReport, IntruderOutcome, RecoveryInfo, TrafficState, TurnDirection,
};
