#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Nearest-creep acquisition and weapon aiming for towers.

use std::time::Duration;

use bulwark_core::{
    angle::{normalize_angle, shortest_arc},
    CreepId,
};
use glam::Vec2;

/// Maximum weapon rotation speed in radians per second.
pub const MAX_ROTATION_RATE: f32 = 3.0;
/// Factor that scales the remaining angle into the per-tick rotation request.
pub const ROTATION_SMOOTHING: f32 = 8.0;

/// Creep position offered to the scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Identifier of the creep.
    pub id: CreepId,
    /// Position of the creep in tiles.
    pub position: Vec2,
}

/// Creep selected by [`TargetScan::nearest`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Acquisition {
    /// Identifier of the chosen creep.
    pub creep: CreepId,
    /// Position of the chosen creep at scan time.
    pub position: Vec2,
    /// Squared distance between the scan origin and the creep.
    pub distance_sq: f32,
}

/// Target scan that reuses its candidate buffer between ticks.
#[derive(Debug, Default)]
pub struct TargetScan {
    candidates: Vec<TargetCandidate>,
}

impl TargetScan {
    /// Creates a scan with an empty candidate buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the candidate buffer, keeping the provided order.
    pub fn prepare<I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = TargetCandidate>,
    {
        self.candidates.clear();
        self.candidates.extend(candidates);
    }

    /// Candidates captured by the last [`Self::prepare`] call.
    #[must_use]
    pub fn candidates(&self) -> &[TargetCandidate] {
        &self.candidates
    }

    /// Finds the candidate closest to `origin`.
    ///
    /// Distances are compared squared. When two candidates are equally close
    /// the one captured first wins.
    #[must_use]
    pub fn nearest(&self, origin: Vec2) -> Option<Acquisition> {
        let mut best: Option<Acquisition> = None;
        for candidate in &self.candidates {
            let distance_sq = candidate.position.distance_squared(origin);
            if best.map_or(true, |current| distance_sq < current.distance_sq) {
                best = Some(Acquisition {
                    creep: candidate.id,
                    position: candidate.position,
                    distance_sq,
                });
            }
        }
        best
    }
}

/// Eases a weapon heading toward a bearing with a bounded angular rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimController {
    max_rate: f32,
    smoothing: f32,
}

impl AimController {
    /// Creates a controller with explicit limits.
    #[must_use]
    pub const fn new(max_rate: f32, smoothing: f32) -> Self {
        Self {
            max_rate,
            smoothing,
        }
    }

    /// Returns the heading after turning toward `bearing` for `dt`.
    ///
    /// The shortest signed arc is scaled by the smoothing factor and clamped
    /// to `max_rate * dt`, so a weapon eases in near the target and never
    /// turns faster than its limit.
    #[must_use]
    pub fn step(&self, heading: f32, bearing: f32, dt: Duration) -> f32 {
        let seconds = dt.as_secs_f32();
        let limit = self.max_rate * seconds;
        let request = shortest_arc(heading, bearing) * self.smoothing * seconds;
        normalize_angle(heading + request.clamp(-limit, limit))
    }
}

impl Default for AimController {
    fn default() -> Self {
        Self::new(MAX_ROTATION_RATE, ROTATION_SMOOTHING)
    }
}
