//! Hypothesis evaluator
//!
//! Answers "if the ownship adopted this velocity right now, how soon would
//! any intruder violate, and when is closest approach?" against a live
//! engine working set, without the query being observable afterwards.
//!
//! The mutate-and-restore sequence is an explicit transaction:
//! [`HypothesisEvaluator::begin`] snapshots the working set and injects the
//! substitute ownship velocity, [`HypothesisTransaction::query`] reads
//! conflict timing per intruder, and [`HypothesisTransaction::finish`]
//! restores the original picture. Dropping a transaction without finishing
//! restores as well, so early exits cannot leak the hypothetical state.

use std::cell::Cell;

use super::engine::DaaEngine;
use super::types::{ConflictTime, HypothesisReport, IntruderOutcome, TrafficState};
use crate::error::{EngineError, HypothesisError};
use crate::geo::GroundVelocity;

/// Captured traffic picture: the ownship and every valid intruder.
///
/// Comparing a snapshot taken before a query with one taken after is the
/// restoration guarantee, so this type is `PartialEq` field-for-field.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSnapshot {
    pub ownship: TrafficState,
    pub intruders: Vec<TrafficState>,
}

impl TrafficSnapshot {
    /// Capture the current working set of an engine.
    ///
    /// Intruders whose state is stale are skipped; they are no longer part
    /// of the picture the engine evaluates against.
    pub fn capture<E: DaaEngine>(engine: &E) -> Result<Self, HypothesisError> {
        let count = engine.aircraft_count();
        let ownship = match engine.traffic_state(0) {
            Some(state) if count > 0 => state,
            _ => return Err(HypothesisError::NoOwnship),
        };

        let intruders = (1..count)
            .filter(|&index| engine.is_valid(index))
            .filter_map(|index| engine.traffic_state(index))
            .collect();

        Ok(TrafficSnapshot { ownship, intruders })
    }
}

/// Coordinator for hypothesis queries against a shared engine working set.
///
/// The evaluator itself holds no traffic state; it owns the transaction
/// discipline. Only one transaction may be in flight at a time, tracked by
/// a latch rather than left to convention, so an attempted overlap is a
/// reported protocol error instead of a silently interleaved query.
#[derive(Debug, Default)]
pub struct HypothesisEvaluator {
    // Cell, not a lock: the invocation model is single-threaded and
    // synchronous, the latch only has to catch protocol misuse.
    in_flight: Cell<bool>,
}

impl HypothesisEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a hypothesis transaction: snapshot the working set and submit
    /// the substitute ownship velocity, re-pairing every snapshotted
    /// intruder with it.
    ///
    /// Fails with [`HypothesisError::ReentrantQuery`] while another
    /// transaction is open, without touching that transaction's state.
    pub fn begin<'a, E: DaaEngine>(
        &'a self,
        engine: &'a mut E,
        velocity: GroundVelocity,
    ) -> Result<HypothesisTransaction<'a, E>, HypothesisError> {
        if self.in_flight.get() {
            return Err(HypothesisError::ReentrantQuery);
        }

        let snapshot = TrafficSnapshot::capture(engine)?;
        log::debug!(
            "hypothesis: begin for {} with {} intruder(s), substitute track {:.1} deg",
            snapshot.ownship.id,
            snapshot.intruders.len(),
            velocity.track().to_degrees()
        );

        self.in_flight.set(true);
        let mut txn = HypothesisTransaction {
            engine,
            snapshot,
            velocity,
            latch: &self.in_flight,
            restored: false,
        };
        txn.inject()?;
        Ok(txn)
    }

    /// Run a whole hypothesis query as one call: begin, query every
    /// intruder, restore, and return the report.
    pub fn evaluate<E: DaaEngine>(
        &self,
        engine: &mut E,
        velocity: GroundVelocity,
    ) -> Result<HypothesisReport, HypothesisError> {
        let txn = self.begin(engine, velocity)?;
        let report = txn.query()?;
        txn.finish()?;
        Ok(report)
    }
}

/// An open hypothesis transaction.
///
/// While this value lives, the engine's working set holds the hypothetical
/// ownship velocity. Restoration runs on every exit path: explicitly via
/// [`finish`](Self::finish), which surfaces restore failures, or in `Drop`
/// as a backstop for early exits.
pub struct HypothesisTransaction<'a, E: DaaEngine> {
    engine: &'a mut E,
    snapshot: TrafficSnapshot,
    velocity: GroundVelocity,
    latch: &'a Cell<bool>,
    restored: bool,
}

impl<'a, E: DaaEngine> HypothesisTransaction<'a, E> {
    /// The traffic picture captured when the transaction opened
    pub fn snapshot(&self) -> &TrafficSnapshot {
        &self.snapshot
    }

    /// The substitute ownship velocity under evaluation
    pub fn velocity(&self) -> GroundVelocity {
        self.velocity
    }

    /// Submit the hypothetical ownship state and re-submit the snapshotted
    /// intruders against it
    fn inject(&mut self) -> Result<(), HypothesisError> {
        let own = &self.snapshot.ownship;
        self.engine
            .set_ownship_state(&own.id, own.position, self.velocity, own.time)
            .map_err(HypothesisError::Query)?;
        for intruder in &self.snapshot.intruders {
            self.engine
                .add_traffic_state(
                    &intruder.id,
                    intruder.position,
                    intruder.velocity,
                    Some(intruder.time),
                )
                .map_err(HypothesisError::Query)?;
        }
        Ok(())
    }

    /// Query conflict timing for every snapshotted intruder and aggregate.
    ///
    /// The aggregate closest-approach time is the minimum among intruders
    /// whose time-to-violation is finite; with no predicted violator it is
    /// [`ConflictTime::Never`].
    pub fn query(&self) -> Result<HypothesisReport, HypothesisError> {
        let mut intruders = Vec::with_capacity(self.snapshot.intruders.len());

        for state in &self.snapshot.intruders {
            let index = self
                .engine
                .aircraft_index(&state.id)
                .ok_or_else(|| HypothesisError::Query(EngineError::UnknownId(state.id.clone())))?;
            let time_to_violation = self
                .engine
                .time_to_corrective_volume(index)
                .map_err(HypothesisError::Query)?;
            let time_to_closest_approach = self
                .engine
                .time_to_closest_approach(index)
                .map_err(HypothesisError::Query)?;

            log::trace!(
                "hypothesis: {} ttv {:?} tcpa {:.1}s",
                state.id,
                time_to_violation,
                time_to_closest_approach
            );
            intruders.push(IntruderOutcome {
                id: state.id.clone(),
                index,
                time_to_violation,
                time_to_closest_approach,
            });
        }

        let earliest_violation = intruders
            .iter()
            .map(|o| o.time_to_violation)
            .fold(ConflictTime::Never, ConflictTime::earliest);
        let earliest_closest_approach = intruders
            .iter()
            .filter(|o| !o.time_to_violation.is_never())
            .map(|o| ConflictTime::At(o.time_to_closest_approach))
            .fold(ConflictTime::Never, ConflictTime::earliest);

        Ok(HypothesisReport {
            velocity: self.velocity,
            intruders,
            earliest_violation,
            earliest_closest_approach,
        })
    }

    /// Restore the original traffic picture and close the transaction.
    ///
    /// A failed re-submission leaves the working set inconsistent with what
    /// callers observed before the query; that is surfaced as
    /// [`HypothesisError::RestoreFailure`] and never retried here.
    pub fn finish(mut self) -> Result<(), HypothesisError> {
        self.restored = true;
        log::debug!("hypothesis: restoring original state for {}", self.snapshot.ownship.id);
        Self::restore(self.engine, &self.snapshot).map_err(HypothesisError::RestoreFailure)
    }

    fn restore(engine: &mut E, snapshot: &TrafficSnapshot) -> Result<(), EngineError> {
        let own = &snapshot.ownship;
        engine.set_ownship_state(&own.id, own.position, own.velocity, own.time)?;
        for intruder in &snapshot.intruders {
            engine.add_traffic_state(
                &intruder.id,
                intruder.position,
                intruder.velocity,
                Some(intruder.time),
            )?;
        }
        Ok(())
    }
}

impl<'a, E: DaaEngine> Drop for HypothesisTransaction<'a, E> {
    fn drop(&mut self) {
        if !self.restored {
            // Backstop for early exits; Drop cannot propagate the error.
            if let Err(e) = Self::restore(self.engine, &self.snapshot) {
                log::error!("hypothesis: restore failed during unwind: {}", e);
            }
        }
        self.latch.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daa::types::{DirectionBands, HorizontalResolution};
    use crate::geo::GeodeticPoint;

    /// Scripted engine: canned query answers plus failure knobs, so the
    /// transaction protocol can be driven through its error paths.
    #[derive(Default)]
    struct FakeEngine {
        ownship: Option<TrafficState>,
        traffic: Vec<TrafficState>,
        fail_queries: bool,
        /// Successful ownship submissions remaining before a forced failure
        ownship_submissions_before_failure: Option<usize>,
    }

    impl FakeEngine {
        fn with_picture(intruders: usize) -> Self {
            let mut engine = FakeEngine::default();
            engine
                .set_ownship_state(
                    "ownship",
                    GeodeticPoint::from_degrees(0.0, 0.0, 1_000.0),
                    GroundVelocity::from_track(0.0, 100.0, 0.0),
                    0.0,
                )
                .unwrap();
            for k in 0..intruders {
                engine
                    .add_traffic_state(
                        &format!("ac{k}"),
                        GeodeticPoint::from_degrees(0.1 * (k + 1) as f64, 0.0, 1_000.0),
                        GroundVelocity::from_track(3.0, 90.0, 0.0),
                        Some(0.0),
                    )
                    .unwrap();
            }
            engine
        }
    }

    impl DaaEngine for FakeEngine {
        fn set_ownship_state(
            &mut self,
            id: &str,
            position: GeodeticPoint,
            velocity: GroundVelocity,
            time: f64,
        ) -> Result<(), EngineError> {
            if let Some(left) = &mut self.ownship_submissions_before_failure {
                if *left == 0 {
                    return Err(EngineError::Rejected("engine offline".into()));
                }
                *left -= 1;
            }
            self.ownship = Some(TrafficState::new(id, position, velocity, time));
            self.traffic.clear();
            Ok(())
        }

        fn add_traffic_state(
            &mut self,
            id: &str,
            position: GeodeticPoint,
            velocity: GroundVelocity,
            time: Option<f64>,
        ) -> Result<usize, EngineError> {
            let time = time.unwrap_or(0.0);
            let state = TrafficState::new(id, position, velocity, time);
            if let Some(slot) = self.traffic.iter().position(|t| t.id == id) {
                self.traffic[slot] = state;
                Ok(slot + 1)
            } else {
                self.traffic.push(state);
                Ok(self.traffic.len())
            }
        }

        fn aircraft_index(&self, id: &str) -> Option<usize> {
            if self.ownship.as_ref().is_some_and(|o| o.id == id) {
                return Some(0);
            }
            self.traffic.iter().position(|t| t.id == id).map(|i| i + 1)
        }

        fn aircraft_count(&self) -> usize {
            match self.ownship {
                Some(_) => 1 + self.traffic.len(),
                None => 0,
            }
        }

        fn traffic_state(&self, index: usize) -> Option<TrafficState> {
            if index == 0 {
                self.ownship.clone()
            } else {
                self.traffic.get(index - 1).cloned()
            }
        }

        fn is_valid(&self, index: usize) -> bool {
            if index == 0 {
                self.ownship.is_some()
            } else {
                self.traffic.get(index - 1).is_some_and(|t| t.valid)
            }
        }

        fn time_to_corrective_volume(&self, index: usize) -> Result<ConflictTime, EngineError> {
            if self.fail_queries {
                return Err(EngineError::UnknownIndex(index));
            }
            Ok(ConflictTime::At(30.0 + index as f64))
        }

        fn time_to_closest_approach(&self, index: usize) -> Result<f64, EngineError> {
            if self.fail_queries {
                return Err(EngineError::UnknownIndex(index));
            }
            Ok(60.0 + index as f64)
        }

        fn horizontal_direction_bands(&self) -> DirectionBands {
            DirectionBands::default()
        }

        fn horizontal_direction_resolution(&self) -> Option<HorizontalResolution> {
            None
        }
    }

    fn hypothetical() -> GroundVelocity {
        GroundVelocity::from_track(std::f64::consts::FRAC_PI_2, 100.0, 0.0)
    }

    #[test]
    fn test_query_leaves_working_set_untouched() {
        let mut engine = FakeEngine::with_picture(3);
        let before = TrafficSnapshot::capture(&engine).unwrap();

        let evaluator = HypothesisEvaluator::new();
        let report = evaluator.evaluate(&mut engine, hypothetical()).unwrap();

        assert_eq!(report.intruders.len(), 3);
        assert_eq!(TrafficSnapshot::capture(&engine).unwrap(), before);
    }

    #[test]
    fn test_hypothetical_velocity_visible_during_transaction() {
        let mut engine = FakeEngine::with_picture(1);
        let evaluator = HypothesisEvaluator::new();

        let txn = evaluator.begin(&mut engine, hypothetical()).unwrap();
        assert_eq!(txn.snapshot().ownship.velocity.track(), 0.0);
        let mid = txn.engine.traffic_state(0).unwrap();
        assert_eq!(mid.velocity, hypothetical());
        txn.finish().unwrap();
    }

    #[test]
    fn test_aggregation_over_canned_times() {
        let mut engine = FakeEngine::with_picture(2);
        let evaluator = HypothesisEvaluator::new();
        let report = evaluator.evaluate(&mut engine, hypothetical()).unwrap();

        // Indices 1 and 2: violations at 31/32 s, closest approach 61/62 s
        assert_eq!(report.earliest_violation, ConflictTime::At(31.0));
        assert_eq!(report.earliest_closest_approach, ConflictTime::At(61.0));
        assert!(!report.is_clear());
    }

    #[test]
    fn test_empty_intruder_set_aggregates_to_never() {
        let mut engine = FakeEngine::with_picture(0);
        let evaluator = HypothesisEvaluator::new();
        let report = evaluator.evaluate(&mut engine, hypothetical()).unwrap();

        assert!(report.intruders.is_empty());
        assert_eq!(report.earliest_violation, ConflictTime::Never);
        assert_eq!(report.earliest_closest_approach, ConflictTime::Never);
        assert!(report.is_clear());
    }

    #[test]
    fn test_no_ownship_is_rejected() {
        let mut engine = FakeEngine::default();
        let evaluator = HypothesisEvaluator::new();
        assert!(matches!(
            evaluator.evaluate(&mut engine, hypothetical()),
            Err(HypothesisError::NoOwnship)
        ));
    }

    #[test]
    fn test_reentrant_query_rejected_and_first_restores() {
        let mut engine_a = FakeEngine::with_picture(2);
        let mut engine_b = FakeEngine::with_picture(1);
        let before_a = TrafficSnapshot::capture(&engine_a).unwrap();

        let evaluator = HypothesisEvaluator::new();
        let txn = evaluator.begin(&mut engine_a, hypothetical()).unwrap();

        assert!(matches!(
            evaluator.evaluate(&mut engine_b, hypothetical()),
            Err(HypothesisError::ReentrantQuery)
        ));

        // The open transaction is unaffected and restores normally
        txn.finish().unwrap();
        assert_eq!(TrafficSnapshot::capture(&engine_a).unwrap(), before_a);

        // Once closed, new transactions are accepted again
        assert!(evaluator.evaluate(&mut engine_b, hypothetical()).is_ok());
    }

    #[test]
    fn test_query_failure_still_restores() {
        let mut engine = FakeEngine::with_picture(2);
        engine.fail_queries = true;
        let before = TrafficSnapshot::capture(&engine).unwrap();

        let evaluator = HypothesisEvaluator::new();
        let result = evaluator.evaluate(&mut engine, hypothetical());

        assert!(matches!(result, Err(HypothesisError::Query(_))));
        assert_eq!(TrafficSnapshot::capture(&engine).unwrap(), before);

        // The latch was released on the error path
        assert!(matches!(
            evaluator.evaluate(&mut engine, hypothetical()),
            Err(HypothesisError::Query(_))
        ));
    }

    #[test]
    fn test_restore_failure_is_surfaced() {
        let mut engine = FakeEngine::with_picture(1);
        // One more ownship submission succeeds (the hypothetical); the
        // restoring submission fails.
        engine.ownship_submissions_before_failure = Some(1);

        let evaluator = HypothesisEvaluator::new();
        let result = evaluator.evaluate(&mut engine, hypothetical());
        assert!(matches!(result, Err(HypothesisError::RestoreFailure(_))));
    }

    #[test]
    fn test_report_serializes_with_explicit_never() {
        let mut engine = FakeEngine::with_picture(0);
        let evaluator = HypothesisEvaluator::new();
        let report = evaluator.evaluate(&mut engine, hypothetical()).unwrap();

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"never\""));
        let back: HypothesisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
