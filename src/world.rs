//! City obstacle layout
//!
//! The towers stand in three concentric rings around the central plaza, each
//! ring angularly offset by half a slot so flight lanes between them zigzag.
//! Only the colliders matter to the sim; whatever geometry a renderer hangs
//! on them is its own business.

use crate::consts::{REGION_X, REGION_Z};
use crate::sim::Obstacle;

/// Collision radius per tower
pub const TOWER_RADIUS: f32 = 8.0;

/// Ring radii of the tower districts, inner to outer
const DISTRICT_RADII: [f32; 3] = [35.0, 55.0, 75.0];
/// Towers per district ring
const DISTRICT_COUNTS: [usize; 3] = [8, 10, 12];

/// Build the city's tower colliders. The layout is fixed; the plaza at the
/// center stays clear so every run starts in open air.
pub fn city_obstacles() -> Vec<Obstacle> {
    let mut obstacles = Vec::new();

    for (ring, (&radius, &count)) in DISTRICT_RADII.iter().zip(&DISTRICT_COUNTS).enumerate() {
        // Half-slot offset per ring staggers the lanes
        let offset = std::f32::consts::PI / count as f32 + ring as f32 * 0.35;

        for i in 0..count {
            let angle = offset + (i as f32 / count as f32) * std::f32::consts::TAU;
            let x = angle.cos() * radius;
            let z = angle.sin() * radius;
            obstacles.push(Obstacle::new(x, z, TOWER_RADIUS));
        }
    }

    obstacles
}
