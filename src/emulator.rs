//! Kinematic detect-and-avoid engine emulator
//!
//! A self-contained [`DaaEngine`] implementation for tests and integration
//! work without the real engine. Aircraft are extrapolated along straight
//! lines in a local frame anchored at the ownship; conflict timing is the
//! classic relative-velocity CPA/volume-entry math. It makes no attempt to
//! reproduce a certified alerting logic.

use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::daa::{
    BandRegion, ConflictTime, DaaEngine, DirectionBand, DirectionBands, HorizontalResolution,
    RecoveryInfo, TrafficState, TurnDirection,
};
use crate::error::EngineError;
use crate::geo::{AziEquiProjection, GeodeticPoint, GroundVelocity};

/// Emulator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmulatorSettings {
    /// Corrective volume radius in meters
    pub horizontal_separation: f64,
    /// Corrective volume half-height in meters
    pub vertical_separation: f64,
    /// Prediction horizon in seconds
    pub lookahead: f64,
    /// Track sampling step for direction bands, radians
    pub band_step: f64,
}

impl Default for EmulatorSettings {
    fn default() -> Self {
        EmulatorSettings {
            horizontal_separation: 9_260.0, // 5 NM
            vertical_separation: 300.0,
            lookahead: 180.0,
            band_step: 5.0_f64.to_radians(),
        }
    }
}

/// Linear-extrapolation detect-and-avoid engine.
///
/// The working set follows the engine contract: setting the ownship resets
/// the intruder list, re-submitting a tracked id replaces its state and
/// keeps its index.
#[derive(Debug, Default)]
pub struct KinematicEngine {
    settings: EmulatorSettings,
    projection: Option<AziEquiProjection>,
    ownship: Option<TrafficState>,
    traffic: Vec<TrafficState>,
}

impl KinematicEngine {
    pub fn new(settings: EmulatorSettings) -> Self {
        KinematicEngine {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &EmulatorSettings {
        &self.settings
    }

    /// Intruder state relative to the ownship flying `ownship_velocity`,
    /// in the local frame anchored at the ownship position.
    ///
    /// An intruder beyond the projection range is beyond any conflict
    /// horizon, so `None` here reads as "no predicted conflict".
    fn relative(
        &self,
        ownship_velocity: &GroundVelocity,
        intruder: &TrafficState,
    ) -> Option<(Vector3<f64>, Vector3<f64>)> {
        let proj = self.projection.as_ref()?;
        let own = self.ownship.as_ref()?;

        let own_pos = proj.project(&own.position).ok()?;
        let own_vel = proj.project_velocity(&own.position, ownship_velocity).ok()?;
        let int_pos = proj.project(&intruder.position).ok()?;
        let int_vel = proj
            .project_velocity(&intruder.position, &intruder.velocity)
            .ok()?;

        Some((int_pos - own_pos, int_vel - own_vel))
    }

    /// Time interval during which the relative track is inside the
    /// corrective volume, if it ever is
    fn volume_interval(&self, rel_pos: &Vector3<f64>, rel_vel: &Vector3<f64>) -> Option<(f64, f64)> {
        let r_h = self.settings.horizontal_separation;
        let h = self.settings.vertical_separation;

        // Horizontal: |r + v t| = R is a quadratic in t
        let v_sq = rel_vel.x * rel_vel.x + rel_vel.y * rel_vel.y;
        let rv_dot = rel_pos.x * rel_vel.x + rel_pos.y * rel_vel.y;
        let c = rel_pos.x * rel_pos.x + rel_pos.y * rel_pos.y - r_h * r_h;

        let horizontal = if v_sq < 1e-9 {
            if c <= 0.0 {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                return None;
            }
        } else {
            let disc = rv_dot * rv_dot - v_sq * c;
            if disc < 0.0 {
                return None;
            }
            let sqrt_disc = disc.sqrt();
            ((-rv_dot - sqrt_disc) / v_sq, (-rv_dot + sqrt_disc) / v_sq)
        };

        let vertical = if rel_vel.z.abs() < 1e-9 {
            if rel_pos.z.abs() <= h {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                return None;
            }
        } else {
            let t0 = (-h - rel_pos.z) / rel_vel.z;
            let t1 = (h - rel_pos.z) / rel_vel.z;
            (t0.min(t1), t0.max(t1))
        };

        let entry = horizontal.0.max(vertical.0);
        let exit = horizontal.1.min(vertical.1);
        if entry <= exit {
            Some((entry, exit))
        } else {
            None
        }
    }

    /// Time until volume entry within the lookahead, `Never` otherwise
    fn entry_time(&self, rel_pos: &Vector3<f64>, rel_vel: &Vector3<f64>) -> ConflictTime {
        match self.volume_interval(rel_pos, rel_vel) {
            Some((entry, exit)) if exit >= 0.0 && entry <= self.settings.lookahead => {
                ConflictTime::At(entry.max(0.0))
            }
            _ => ConflictTime::Never,
        }
    }

    /// Soonest volume entry across all intruders for a candidate ownship
    /// velocity
    fn worst_entry(&self, ownship_velocity: &GroundVelocity) -> ConflictTime {
        self.traffic
            .iter()
            .filter(|t| t.valid)
            .filter_map(|t| self.relative(ownship_velocity, t))
            .map(|(pos, vel)| self.entry_time(&pos, &vel))
            .fold(ConflictTime::Never, ConflictTime::earliest)
    }

    fn classify(&self, entry: ConflictTime) -> BandRegion {
        match entry.seconds() {
            None => BandRegion::Clear,
            Some(t) if t <= self.settings.lookahead / 3.0 => BandRegion::Near,
            Some(t) if t <= 2.0 * self.settings.lookahead / 3.0 => BandRegion::Mid,
            Some(_) => BandRegion::Far,
        }
    }

    /// Recovery guidance when the ownship is currently inside the volume
    fn recovery(&self, ownship_velocity: &GroundVelocity) -> Option<RecoveryInfo> {
        let mut worst_exit: Option<f64> = None;
        for intruder in self.traffic.iter().filter(|t| t.valid) {
            let Some((pos, vel)) = self.relative(ownship_velocity, intruder) else {
                continue;
            };
            if let Some((entry, exit)) = self.volume_interval(&pos, &vel) {
                if entry <= 0.0 && exit >= 0.0 {
                    worst_exit = Some(worst_exit.map_or(exit, |w: f64| w.max(exit)));
                }
            }
        }
        worst_exit.map(|time_to_recovery| RecoveryInfo {
            time_to_recovery,
            horizontal_distance: self.settings.horizontal_separation,
            vertical_distance: self.settings.vertical_separation,
        })
    }

    fn intruder(&self, index: usize) -> Result<&TrafficState, EngineError> {
        if index == 0 || !self.is_valid(index) {
            return Err(EngineError::UnknownIndex(index));
        }
        self.traffic
            .get(index - 1)
            .ok_or(EngineError::UnknownIndex(index))
    }
}

impl DaaEngine for KinematicEngine {
    fn set_ownship_state(
        &mut self,
        id: &str,
        position: GeodeticPoint,
        velocity: GroundVelocity,
        time: f64,
    ) -> Result<(), EngineError> {
        self.projection = Some(AziEquiProjection::new(position));
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
        let own = self
            .ownship
            .as_ref()
            .ok_or_else(|| EngineError::Rejected("no ownship state".into()))?;
        if own.id == id {
            return Err(EngineError::Rejected(format!(
                "id {id:?} is the ownship"
            )));
        }

        let time = time.unwrap_or(own.time);
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
        let intruder = self.intruder(index)?;
        let own_velocity = self.ownship.as_ref().unwrap().velocity;
        Ok(self
            .relative(&own_velocity, intruder)
            .map(|(pos, vel)| self.entry_time(&pos, &vel))
            .unwrap_or(ConflictTime::Never))
    }

    fn time_to_closest_approach(&self, index: usize) -> Result<f64, EngineError> {
        let intruder = self.intruder(index)?;
        let own_velocity = self.ownship.as_ref().unwrap().velocity;
        let Some((pos, vel)) = self.relative(&own_velocity, intruder) else {
            return Ok(0.0);
        };

        let rv_dot = pos.x * vel.x + pos.y * vel.y;
        let v_sq = vel.x * vel.x + vel.y * vel.y;
        if v_sq < 1e-6 {
            // Same course and speed: separation is constant
            return Ok(0.0);
        }
        Ok(-rv_dot / v_sq)
    }

    fn horizontal_direction_bands(&self) -> DirectionBands {
        let Some(own) = self.ownship.as_ref() else {
            return DirectionBands::default();
        };

        let steps = (TAU / self.settings.band_step).round().max(1.0) as usize;
        let step = TAU / steps as f64;
        let regions: Vec<BandRegion> = (0..steps)
            .map(|k| {
                let candidate = own.velocity.with_track(k as f64 * step);
                self.classify(self.worst_entry(&candidate))
            })
            .collect();

        let mut bands = Vec::new();
        let mut start = 0usize;
        for k in 1..=steps {
            if k == steps || regions[k] != regions[start] {
                bands.push(DirectionBand {
                    region: regions[start],
                    low: start as f64 * step,
                    high: k as f64 * step,
                });
                start = k;
            }
        }

        DirectionBands {
            bands,
            recovery: self.recovery(&own.velocity),
        }
    }

    fn horizontal_direction_resolution(&self) -> Option<HorizontalResolution> {
        let own = self.ownship.as_ref()?;
        if self.worst_entry(&own.velocity).is_never() {
            return None;
        }

        let step = self.settings.band_step;
        let current = own.velocity.track();
        let max_offsets = (PI / step).ceil() as usize;

        for k in 1..=max_offsets {
            let offset = k as f64 * step;
            for (direction, track) in [
                (TurnDirection::Right, current + offset),
                (TurnDirection::Left, current - offset),
            ] {
                let candidate = own.velocity.with_track(track.rem_euclid(TAU));
                if self.worst_entry(&candidate).is_never() {
                    return Some(HorizontalResolution {
                        direction,
                        track: track.rem_euclid(TAU),
                    });
                }
            }
        }
        None
    }

    fn set_lookahead_time(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.settings.lookahead = seconds;
        }
    }
}
