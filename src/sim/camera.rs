//! Chase camera with accumulated pan
//!
//! The camera sits at a fixed local offset behind and above the aircraft,
//! rotated into the aircraft's orientation, plus a 2D pan offset expressed in
//! the camera's own right/up axes. The pan decays geometrically toward zero
//! every tick, input or not, so it can never get stuck off-center.

use glam::{Vec2, Vec3};

use super::state::Player;
use crate::consts::*;

/// Camera state: accumulated pan plus the derived transform of the last update
#[derive(Debug, Clone)]
pub struct CameraRig {
    /// Accumulated pan offset (camera-local right/up)
    pub pan: Vec2,
    /// World position derived on the last update
    pub position: Vec3,
    /// Look-at target derived on the last update
    pub target: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            position: Vec3::new(0.0, 5.0, 12.0),
            target: Vec3::ZERO,
        }
    }
}

impl CameraRig {
    /// Accumulate pan from a drag delta (already scaled by the frontend)
    pub fn add_pan(&mut self, dx: f32, dy: f32) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Right/up axes of the current view, from the previous frame's transform
    fn view_basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        if forward.length_squared() < 1e-6 {
            return (Vec3::X, Vec3::Y);
        }
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        if right.length_squared() < 1e-6 {
            // Looking straight up or down; keep a stable fallback
            return (Vec3::X, Vec3::Y);
        }
        (right, right.cross(forward))
    }

    /// Recompute the camera transform from the player, then decay the pan
    pub fn update(&mut self, player: &Player) {
        let world_offset = player.orientation() * CAMERA_FOLLOW_OFFSET;

        let (right, up) = self.view_basis();
        let pan_world = right * self.pan.x + up * self.pan.y;

        self.position = player.position + world_offset + pan_world;
        self.target = player.position + pan_world;

        self.pan *= CAMERA_PAN_DECAY;
    }
}
