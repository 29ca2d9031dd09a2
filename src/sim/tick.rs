//! Per-frame session update
//!
//! One `tick(session, input, dt)` call per rendered frame, with `dt` supplied
//! by the caller. Everything mutates synchronously in a fixed order: clock and
//! phase gates, boost, movement, entity aging, spawning, collection, cleanup,
//! effects, camera. After game over the gameplay state freezes but effects,
//! orb animation and the camera keep updating so the scene stays alive.

use super::collision;
use super::spawn;
use super::state::{Effect, RunState, Session, SessionEvent};
use crate::consts::*;

/// Key-state snapshot for one tick, assembled by the frontend from whatever
/// input device is driving the aircraft.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub ascend: bool,
    pub descend: bool,
    pub boost: bool,
}

/// Advance the session by one frame
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) {
    // Combo decay runs in every state
    if session.combo_timer > 0.0 {
        session.combo_timer -= dt;
        if session.combo_timer <= 0.0 {
            session.combo_timer = 0.0;
            session.combo_count = 0;
        }
    }

    if session.state != RunState::Playing {
        // Keep the scene visually alive: orbs pulse out, effects finish,
        // the camera settles. No gameplay mutation.
        for orb in &mut session.orbs {
            orb.step(dt);
        }
        session.orbs.retain(|o| !o.is_inert());

        for fx in &mut session.effects {
            fx.step(dt);
        }
        session.effects.retain(|fx| !fx.done);

        session.camera.update(&session.player);
        return;
    }

    // Clock: count up the run, count down the energy
    session.elapsed_time += dt;
    session.time_remaining -= dt;
    if session.time_remaining <= 0.0 {
        session.time_remaining = 0.0;
        session.end_game();
        return;
    }
    if session.time_remaining > MAX_TIME {
        session.time_remaining = MAX_TIME;
    }

    check_phase_gates(session);
    if session.state != RunState::Playing {
        return;
    }

    update_boost(session, input.boost, dt);
    update_player(session, input, dt);

    // Age collectibles before collection: a ring that outlives its lifetime
    // this tick expires rather than being collected
    for ring in &mut session.rings {
        ring.step(dt);
    }
    for orb in &mut session.orbs {
        orb.step(dt);
    }

    spawn::update_spawns(session, dt);

    collect_rings(session);
    collect_orbs(session);

    session.rings.retain(|r| !r.is_inert());
    session.orbs.retain(|o| !o.is_inert());

    for fx in &mut session.effects {
        fx.step(dt);
    }
    session.effects.retain(|fx| !fx.done);

    session.camera.update(&session.player);
}

/// Evaluate the three phase boundaries in order. Each gate fires exactly once,
/// on the first tick where `elapsed_time` crosses it - a large dt can cross
/// more than one boundary and every crossed gate still gets checked.
fn check_phase_gates(session: &mut Session) {
    for gate in 0..3usize {
        let boundary = (gate as f32 + 1.0) * PHASE_DURATION;
        if session.phase_checked[gate] || session.elapsed_time < boundary {
            continue;
        }
        session.phase_checked[gate] = true;

        if session.score < PHASE_TARGETS[gate] {
            // Missed the checkpoint; phase stays where it was
            session.end_game();
            return;
        }

        if gate == 2 {
            // Cleared the final checkpoint: the run is won and ends here
            session.end_game();
            return;
        }

        session.phase = gate as u8 + 2;
        log::info!("Phase {} reached (score {})", session.phase, session.score);
        session.push_event(SessionEvent::PhaseAdvanced {
            phase: session.phase,
        });
    }
}

/// Drain or regenerate boost and set the current speed. The speed multiplier
/// only applies while there is fuel; holding boost on an empty tank neither
/// boosts nor regenerates.
fn update_boost(session: &mut Session, boost_held: bool, dt: f32) {
    if boost_held && session.boost_remaining > 0.0 {
        session.player.current_speed = BASE_SPEED * BOOST_MULTIPLIER;
        session.boost_remaining = (session.boost_remaining - dt * BOOST_DRAIN_RATE).max(0.0);
        if !session.was_boosting {
            session.push_event(SessionEvent::BoostStarted);
        }
        session.was_boosting = true;
    } else {
        session.player.current_speed = BASE_SPEED;
        if !boost_held && session.boost_remaining < BOOST_MAX {
            session.boost_remaining = (session.boost_remaining + dt * BOOST_REGEN_RATE).min(BOOST_MAX);
        }
        session.was_boosting = false;
    }
}

/// Integrate orientation and position, then resolve against the world
fn update_player(session: &mut Session, input: &TickInput, dt: f32) {
    let player = &mut session.player;

    let yaw_input = (input.yaw_left as i8 - input.yaw_right as i8) as f32;
    player.yaw += yaw_input * TURN_SPEED * dt;

    let pitch_input = (input.pitch_up as i8 - input.pitch_down as i8) as f32;
    player.pitch = (player.pitch + pitch_input * PITCH_SPEED * dt).clamp(-MAX_PITCH, MAX_PITCH);

    // Always flying forward; vertical thrusters adjust altitude directly
    let mut desired = player.position + player.forward() * player.current_speed * dt;
    if input.ascend {
        desired.y += BASE_SPEED * VERTICAL_SPEED_FACTOR * dt;
    }
    if input.descend {
        desired.y -= BASE_SPEED * VERTICAL_SPEED_FACTOR * dt;
    }

    desired = collision::clamp_to_bounds(desired);
    desired = collision::resolve_obstacles(desired, session.obstacles(), AIRCRAFT_RADIUS);
    session.player.position = desired;
}

/// Collect every active ring the aircraft is flying through: combo, score,
/// boost restore, burst effect, event.
pub(crate) fn collect_rings(session: &mut Session) {
    let player_pos = session.player.position;

    let mut hits = Vec::new();
    for ring in &mut session.rings {
        if ring.is_inert() {
            continue;
        }
        if collision::within_radius(player_pos, ring.position, ring.collect_radius()) {
            ring.collected = true;
            hits.push(ring.position);
        }
    }

    for position in hits {
        if session.combo_timer > 0.0 {
            session.combo_count += 1;
        } else {
            session.combo_count = 1;
        }
        session.combo_timer = COMBO_WINDOW;

        let bonus = session.combo_count.saturating_sub(1);
        let points = 1 + bonus;
        session.score += points;

        session.boost_remaining =
            (session.boost_remaining + 0.8 + 0.2 * bonus as f32).min(BOOST_MAX);

        let burst = Effect::burst(position, &mut session.rng);
        session.effects.push(burst);
        session.push_event(SessionEvent::RingCollected {
            combo: session.combo_count,
            points,
            position,
        });
    }
}

/// Collect every active orb in trigger range: beam + burst, time bonus, event
pub(crate) fn collect_orbs(session: &mut Session) {
    let player_pos = session.player.position;

    let mut hits = Vec::new();
    for orb in &mut session.orbs {
        if orb.is_inert() {
            continue;
        }
        if collision::within_radius(player_pos, orb.position, orb.trigger_radius) {
            orb.collected = true;
            hits.push(orb.position);
        }
    }

    for position in hits {
        session.effects.push(Effect::beam(player_pos, position));
        let burst = Effect::burst(position, &mut session.rng);
        session.effects.push(burst);

        session.time_remaining = (session.time_remaining + ORB_TIME_BONUS).min(MAX_TIME);
        session.push_event(SessionEvent::OrbCollected { position });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Difficulty, Obstacle, Ring, TimeOrb};
    use glam::Vec3;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn playing_session() -> Session {
        let mut session = Session::new(4242);
        session.set_difficulty(Difficulty::Hard);
        session
    }

    /// Push the spawn timers far out so background spawns cannot disturb
    /// tests that assert exact scores, times or boost levels.
    fn defer_spawns(session: &mut Session) {
        session.spawner.ring_timer = 1.0e6;
        session.spawner.orb_timer = 1.0e6;
    }

    fn ring_at(session: &Session, position: Vec3) -> Ring {
        Ring::new(
            position,
            session.ring_inner_radius(),
            session.ring_tube_radius(),
        )
    }

    #[test]
    fn test_waiting_session_does_not_advance_clock() {
        let mut session = Session::new(1);
        let input = TickInput::default();
        for _ in 0..100 {
            tick(&mut session, &input, DT);
        }
        assert_eq!(session.state, RunState::Waiting);
        assert_eq!(session.elapsed_time, 0.0);
        assert_eq!(session.time_remaining, LEVEL_DURATION);
        assert!(session.rings.is_empty());
    }

    #[test]
    fn test_timeout_ends_game() {
        let mut session = playing_session();
        session.time_remaining = 0.5;

        tick(&mut session, &TickInput::default(), 1.0);
        assert_eq!(session.state, RunState::GameOver);
        assert_eq!(session.time_remaining, 0.0);

        let events = session.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, SessionEvent::GameOver { .. }))
        );
    }

    #[test]
    fn test_game_over_freezes_gameplay_state() {
        let mut session = playing_session();
        session.time_remaining = 0.01;
        tick(&mut session, &TickInput::default(), 1.0);
        assert_eq!(session.state, RunState::GameOver);
        session.drain_events();

        session.effects.push(Effect::beam(Vec3::ZERO, Vec3::X));
        let score = session.score;
        let phase = session.phase;
        let elapsed = session.elapsed_time;
        let pan_before = {
            session.camera.add_pan(1.0, 0.0);
            session.camera.pan
        };

        tick(&mut session, &TickInput::default(), DT);

        assert_eq!(session.score, score);
        assert_eq!(session.phase, phase);
        assert_eq!(session.elapsed_time, elapsed);
        // Effects and camera stay alive
        assert!(session.effects[0].age > 0.0);
        assert!(session.camera.pan.length() < pan_before.length());
        // No second game-over event
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_phase_gate_failure() {
        // Score 10 at the 60s boundary with target 15: run fails
        let mut session = playing_session();
        session.score = 10;
        session.elapsed_time = 59.99;
        session.time_remaining = 50.0;

        tick(&mut session, &TickInput::default(), 0.02);
        assert_eq!(session.state, RunState::GameOver);
        assert_eq!(session.phase, 1);
    }

    #[test]
    fn test_phase_gate_pass() {
        // Score 20 at the 60s boundary with target 15: run continues
        let mut session = playing_session();
        session.score = 20;
        session.elapsed_time = 59.99;
        session.time_remaining = 50.0;

        tick(&mut session, &TickInput::default(), 0.02);
        assert_eq!(session.state, RunState::Playing);
        assert_eq!(session.phase, 2);

        let events = session.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, SessionEvent::PhaseAdvanced { phase: 2 }))
        );
    }

    #[test]
    fn test_phase_gate_fires_exactly_once() {
        // Holding elapsed time past a boundary must not re-fire the gate
        let mut session = playing_session();
        session.score = 20;
        session.elapsed_time = 59.99;
        session.time_remaining = 90.0;

        for _ in 0..50 {
            tick(&mut session, &TickInput::default(), 0.02);
        }
        assert_eq!(session.phase, 2);
        assert!(session.phase_checked[0]);
        assert!(!session.phase_checked[1]);

        let advances = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::PhaseAdvanced { .. }))
            .count();
        assert_eq!(advances, 1);
    }

    #[test]
    fn test_large_dt_checks_every_crossed_gate() {
        // A single huge frame crossing both the 60s and 120s boundaries
        // still evaluates both gates in order
        let mut session = playing_session();
        session.score = 30;
        session.elapsed_time = 55.0;
        session.time_remaining = 99.0;

        tick(&mut session, &TickInput::default(), 70.0);
        assert!(session.phase_checked[0]);
        assert!(session.phase_checked[1]);
        assert_eq!(session.phase, 3);
        assert_eq!(session.state, RunState::Playing);
    }

    #[test]
    fn test_phase_three_clear_is_a_win_and_ends_the_run() {
        let mut session = playing_session();
        session.score = 50;
        session.phase = 3;
        session.phase_checked = [true, true, false];
        session.elapsed_time = 179.99;
        session.time_remaining = 40.0;

        tick(&mut session, &TickInput::default(), 0.02);
        assert_eq!(session.state, RunState::GameOver);
        assert_eq!(session.phase, 3);
    }

    #[test]
    fn test_orb_pickup_adds_time_with_cap() {
        // 60s + orb -> 65s; repeated pickups saturate at MAX_TIME
        let mut session = playing_session();
        defer_spawns(&mut session);
        session.time_remaining = 60.0;
        session.orbs.push(TimeOrb::new(session.player.position));

        tick(&mut session, &TickInput::default(), 0.001);
        assert!((session.time_remaining - 65.0).abs() < 0.01);

        for _ in 0..20 {
            session.orbs.push(TimeOrb::new(session.player.position));
            tick(&mut session, &TickInput::default(), 0.001);
        }
        assert!(session.time_remaining <= MAX_TIME);
        assert!((session.time_remaining - MAX_TIME).abs() < 0.1);
    }

    #[test]
    fn test_ring_collection_boundary_inclusive() {
        // A ring at exactly the collect radius still collects
        let mut session = playing_session();
        let radius = ring_at(&session, Vec3::ZERO).collect_radius();
        let position = session.player.position + Vec3::X * radius;
        session.rings.push(ring_at(&session, position));

        collect_rings(&mut session);
        assert!(session.rings[0].collected);
        assert_eq!(session.score, 1);
        assert_eq!(session.combo_count, 1);
    }

    #[test]
    fn test_combo_chain_scoring() {
        // Three collections inside the combo window chain the bonus
        let mut session = playing_session();

        for expected_combo in 1..=3u32 {
            let position = session.player.position;
            session.rings.push(ring_at(&session, position));
            let before = session.score;
            collect_rings(&mut session);
            session.rings.clear();

            assert_eq!(session.combo_count, expected_combo);
            let bonus = expected_combo - 1;
            assert_eq!(session.score - before, 1 + bonus);

            // A second passes; still inside the 3s window
            session.combo_timer -= 1.0;
            assert!(session.combo_timer > 0.0);
        }
        assert_eq!(session.score, 1 + 2 + 3);
    }

    #[test]
    fn test_combo_resets_after_window() {
        let mut session = playing_session();
        defer_spawns(&mut session);
        session.rings.push(ring_at(&session, session.player.position));
        collect_rings(&mut session);
        session.rings.clear();
        assert_eq!(session.combo_count, 1);

        // Let the window lapse
        session.combo_timer = 0.01;
        tick(&mut session, &TickInput::default(), 0.02);
        assert_eq!(session.combo_count, 0);

        session.rings.push(ring_at(&session, session.player.position));
        collect_rings(&mut session);
        assert_eq!(session.combo_count, 1);
    }

    #[test]
    fn test_ring_collection_restores_boost() {
        let mut session = playing_session();
        session.boost_remaining = 1.0;
        session.rings.push(ring_at(&session, session.player.position));

        collect_rings(&mut session);
        assert!((session.boost_remaining - 1.8).abs() < 1e-5);

        // Restore is capped at the tank size
        session.boost_remaining = BOOST_MAX - 0.1;
        session.rings.clear();
        session.rings.push(ring_at(&session, session.player.position));
        collect_rings(&mut session);
        assert_eq!(session.boost_remaining, BOOST_MAX);
    }

    #[test]
    fn test_boost_with_empty_tank_gives_no_speed() {
        let mut session = playing_session();
        defer_spawns(&mut session);
        session.boost_remaining = 0.0;
        let input = TickInput {
            boost: true,
            ..Default::default()
        };

        tick(&mut session, &input, DT);
        assert_eq!(session.player.current_speed, BASE_SPEED);
        assert_eq!(session.boost_remaining, 0.0);
    }

    #[test]
    fn test_boost_drains_and_fires_start_event_once() {
        let mut session = playing_session();
        defer_spawns(&mut session);
        let input = TickInput {
            boost: true,
            ..Default::default()
        };

        tick(&mut session, &input, DT);
        tick(&mut session, &input, DT);
        assert_eq!(session.player.current_speed, BASE_SPEED * BOOST_MULTIPLIER);
        assert!((session.boost_remaining - (BOOST_MAX - 2.0 * DT)).abs() < 1e-4);

        let starts = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::BoostStarted))
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_boost_regenerates_when_released() {
        let mut session = playing_session();
        defer_spawns(&mut session);
        session.boost_remaining = 2.0;

        tick(&mut session, &TickInput::default(), 1.0);
        assert!((session.boost_remaining - 2.4).abs() < 1e-4);
    }

    #[test]
    fn test_obstacle_blocks_flight_path() {
        let mut session = playing_session();
        // A tower dead ahead of the aircraft (it flies toward -Z)
        let start = session.player.position;
        session.add_obstacle(Obstacle::new(start.x, start.z - 10.0, 5.0));

        for _ in 0..120 {
            tick(&mut session, &TickInput::default(), DT);
        }
        let offset = glam::Vec2::new(
            session.player.position.x - start.x,
            session.player.position.z - (start.z - 10.0),
        );
        assert!(offset.length() >= 5.0 + AIRCRAFT_RADIUS - 1e-3);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut session = playing_session();
        let input = TickInput {
            pitch_up: true,
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut session, &input, DT);
        }
        assert!(session.player.pitch <= MAX_PITCH + 1e-6);
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let mut a = Session::new(31337);
        let mut b = Session::new(31337);
        a.set_difficulty(Difficulty::Normal);
        b.set_difficulty(Difficulty::Normal);

        let inputs = [
            TickInput {
                yaw_left: true,
                ..Default::default()
            },
            TickInput {
                boost: true,
                pitch_up: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..600 {
            let input = inputs[i % inputs.len()];
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }

        assert_eq!(a.score, b.score);
        assert_eq!(a.rings.len(), b.rings.len());
        assert_eq!(a.player.position, b.player.position);
        assert_eq!(a.time_remaining, b.time_remaining);
    }

    #[test]
    fn test_collectibles_never_both_collected_and_expired() {
        // Exclusivity holds over a whole simulated run with pickups
        let mut session = playing_session();
        for i in 0..3000 {
            if i % 90 == 0 {
                let position = session.player.position;
                session.rings.push(ring_at(&session, position));
                session.orbs.push(TimeOrb::new(position));
            }
            tick(&mut session, &TickInput::default(), DT);

            for ring in &session.rings {
                assert!(!(ring.collected && ring.expired));
            }
            for orb in &session.orbs {
                assert!(!(orb.collected && orb.expired));
            }
        }
    }

    proptest! {
        // The clock stays in [0, MAX_TIME] under arbitrary frame deltas
        // and orb pickups
        #[test]
        fn prop_time_remaining_stays_clamped(
            dts in proptest::collection::vec(0.0f32..2.0, 1..200),
            orb_every in 1usize..20,
        ) {
            let mut session = playing_session();
            for (i, dt) in dts.into_iter().enumerate() {
                if i % orb_every == 0 {
                    session.orbs.push(TimeOrb::new(session.player.position));
                }
                tick(&mut session, &TickInput::default(), dt);
                prop_assert!(session.time_remaining >= 0.0);
                prop_assert!(session.time_remaining <= MAX_TIME);
            }
        }

        // Score never decreases while playing, and the aircraft
        // never leaves the flight envelope
        #[test]
        fn prop_score_monotonic_and_player_in_bounds(
            moves in proptest::collection::vec(0u8..128, 1..300),
        ) {
            let mut session = playing_session();
            session.add_obstacle(Obstacle::new(0.0, 0.0, 12.0));
            session.add_obstacle(Obstacle::new(30.0, -20.0, 8.0));

            let mut last_score = session.score;
            for bits in moves {
                let input = TickInput {
                    yaw_left: bits & 1 != 0,
                    yaw_right: bits & 2 != 0,
                    pitch_up: bits & 4 != 0,
                    pitch_down: bits & 8 != 0,
                    ascend: bits & 16 != 0,
                    descend: bits & 32 != 0,
                    boost: bits & 64 != 0,
                };
                let was_playing = session.state == RunState::Playing;
                tick(&mut session, &input, DT);

                if was_playing && session.state == RunState::Playing {
                    prop_assert!(session.score >= last_score);
                }
                last_score = session.score;

                let p = session.player.position;
                prop_assert!(p.x.abs() <= REGION_X + 1e-3);
                prop_assert!(p.z.abs() <= REGION_Z + 1e-3);
                prop_assert!(p.y >= Y_MIN - 1e-3 && p.y <= Y_MAX + 1e-3);
            }
        }
    }
}
