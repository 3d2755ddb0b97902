//! Angle helpers used by weapon aiming and projectile orientation.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Wraps an angle into the half-open interval (−π, π].
///
/// Non-finite input collapses to zero so a corrupted heading cannot poison
/// every later computation.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed rotation that turns `from` into `to` along the shortest arc.
#[must_use]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Angle of the vector pointing from `origin` toward `target`.
#[must_use]
pub fn bearing(origin: Vec2, target: Vec2) -> f32 {
    let delta = target - origin;
    delta.y.atan2(delta.x)
}
