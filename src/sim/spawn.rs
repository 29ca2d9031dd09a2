//! Time-driven stochastic spawning of rings and time orbs
//!
//! Two independent countdown timers, one per collectible type. When a timer
//! fires it is redrawn uniformly within its interval bounds and a new
//! collectible appears at a uniformly random in-bounds position. All
//! randomness comes from the session's seeded RNG.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Ring, RunState, Session, TimeOrb};
use crate::consts::*;

/// Spawn interval timers. Both start at zero so the first ring and orb
/// appear on the first playing tick.
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    pub(crate) ring_timer: f32,
    pub(crate) orb_timer: f32,
}

impl Spawner {
    pub fn reset(&mut self) {
        self.ring_timer = 0.0;
        self.orb_timer = 0.0;
    }
}

/// Uniformly random position inside the flight envelope
fn random_in_bounds(rng: &mut Pcg32) -> Vec3 {
    Vec3::new(
        rng.random_range(-REGION_X..=REGION_X),
        rng.random_range(Y_MIN..=Y_MAX),
        rng.random_range(-REGION_Z..=REGION_Z),
    )
}

/// Advance both spawn timers; spawning only happens while playing
pub fn update_spawns(session: &mut Session, dt: f32) {
    if session.state != RunState::Playing {
        return;
    }

    session.spawner.ring_timer -= dt;
    if session.spawner.ring_timer <= 0.0 {
        session.spawner.ring_timer = session.rng.random_range(RING_SPAWN_MIN..=RING_SPAWN_MAX);
        spawn_ring(session);
    }

    session.spawner.orb_timer -= dt;
    if session.spawner.orb_timer <= 0.0 {
        session.spawner.orb_timer = session.rng.random_range(ORB_SPAWN_MIN..=ORB_SPAWN_MAX);
        spawn_orb(session);
    }
}

fn spawn_ring(session: &mut Session) {
    let position = random_in_bounds(&mut session.rng);
    let ring = Ring::new(
        position,
        session.ring_inner_radius(),
        session.ring_tube_radius(),
    );
    log::debug!("Ring spawned at {:?}", position);
    session.rings.push(ring);
}

fn spawn_orb(session: &mut Session) {
    let position = random_in_bounds(&mut session.rng);
    log::debug!("Time orb spawned at {:?}", position);
    session.orbs.push(TimeOrb::new(position));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Difficulty;

    #[test]
    fn test_first_tick_spawns_immediately() {
        let mut session = Session::new(123);
        session.set_difficulty(Difficulty::Normal);

        update_spawns(&mut session, 1.0 / 60.0);
        assert_eq!(session.rings.len(), 1);
        assert_eq!(session.orbs.len(), 1);
    }

    #[test]
    fn test_no_spawning_outside_playing() {
        let mut session = Session::new(123);
        assert_eq!(session.state, RunState::Waiting);

        for _ in 0..600 {
            update_spawns(&mut session, 1.0 / 60.0);
        }
        assert!(session.rings.is_empty());
        assert!(session.orbs.is_empty());
    }

    #[test]
    fn test_spawn_positions_in_bounds() {
        let mut session = Session::new(77);
        session.set_difficulty(Difficulty::Hard);

        for _ in 0..3000 {
            update_spawns(&mut session, 1.0 / 30.0);
        }
        assert!(session.rings.len() > 10);
        assert!(session.orbs.len() > 5);

        for ring in &session.rings {
            assert!(ring.position.x.abs() <= REGION_X);
            assert!(ring.position.z.abs() <= REGION_Z);
            assert!(ring.position.y >= Y_MIN && ring.position.y <= Y_MAX);
        }
        for orb in &session.orbs {
            assert!(orb.position.x.abs() <= REGION_X);
            assert!(orb.position.z.abs() <= REGION_Z);
            assert!(orb.position.y >= Y_MIN && orb.position.y <= Y_MAX);
        }
    }

    #[test]
    fn test_rings_use_difficulty_geometry() {
        let mut session = Session::new(5);
        session.set_difficulty(Difficulty::Easy);
        update_spawns(&mut session, 0.1);

        let ring = &session.rings[0];
        assert_eq!(ring.inner_radius, 8.0);
        assert!((ring.tube_radius - 1.6).abs() < 1e-6);
    }

    #[test]
    fn test_interval_redraw_within_bounds() {
        let mut session = Session::new(9);
        session.set_difficulty(Difficulty::Normal);

        // Fire the ring timer many times; every redraw must land in [min, max]
        for _ in 0..100 {
            session.spawner.ring_timer = 0.0;
            update_spawns(&mut session, 0.0001);
            assert!(session.spawner.ring_timer >= RING_SPAWN_MIN - 0.0001);
            assert!(session.spawner.ring_timer <= RING_SPAWN_MAX);
        }
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = Session::new(2024);
        let mut b = Session::new(2024);
        a.set_difficulty(Difficulty::Normal);
        b.set_difficulty(Difficulty::Normal);

        for _ in 0..1000 {
            update_spawns(&mut a, 1.0 / 60.0);
            update_spawns(&mut b, 1.0 / 60.0);
        }
        assert_eq!(a.rings.len(), b.rings.len());
        assert_eq!(a.orbs.len(), b.orbs.len());
        for (ra, rb) in a.rings.iter().zip(&b.rings) {
            assert_eq!(ra.position, rb.position);
        }
    }
}
