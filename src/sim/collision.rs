//! World bounds and obstacle resolution for the movement resolver
//!
//! Obstacles are circles in the XZ plane. A tentative position that lands
//! inside an obstacle is pushed radially out to the boundary of the combined
//! radius - a positional correction, not a velocity response. Obstacles are
//! checked sequentially against the possibly-already-corrected position, so
//! with overlapping colliders the last obstacle wins.

use glam::{Vec2, Vec3};

use super::state::Obstacle;
use crate::consts::*;

/// Clamp a tentative position to the flight envelope: hard world walls on
/// X/Z, floor and ceiling on Y.
pub fn clamp_to_bounds(mut pos: Vec3) -> Vec3 {
    pos.y = pos.y.clamp(Y_MIN, Y_MAX);
    pos.x = pos.x.clamp(-REGION_X, REGION_X);
    pos.z = pos.z.clamp(-REGION_Z, REGION_Z);
    pos
}

/// Push a tentative position out of every obstacle it overlaps, in
/// registration order. Y is untouched; buildings block horizontally.
pub fn resolve_obstacles(mut pos: Vec3, obstacles: &[Obstacle], body_radius: f32) -> Vec3 {
    for obs in obstacles {
        let offset = Vec2::new(pos.x, pos.z) - obs.center;
        let combined = obs.radius + body_radius;
        let dist_sq = offset.length_squared();

        if dist_sq < combined * combined {
            // Guard against a position exactly at the obstacle center
            let dist = dist_sq.sqrt().max(1e-4);
            let normal = offset / dist;
            pos.x = obs.center.x + normal.x * combined;
            pos.z = obs.center.y + normal.y * combined;
        }
    }
    pos
}

/// Inclusive sphere check used for ring and orb pickup
#[inline]
pub fn within_radius(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}
