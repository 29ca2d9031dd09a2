//! Session state and gameplay entity types
//!
//! All state the controller mutates during a tick lives here. The sim is
//! deterministic: seeded RNG only, no platform or rendering dependencies.

use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Difficulty presets select the ring geometry (smaller rings are harder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    Normal,
    #[default]
    Hard,
}

impl Difficulty {
    /// Parse a difficulty name; anything unrecognized falls back to the
    /// strictest preset rather than failing.
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "normal" | "medium" => Difficulty::Normal,
            _ => Difficulty::Hard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Inner radius of spawned rings for this preset
    pub fn ring_inner_radius(&self) -> f32 {
        match self {
            Difficulty::Easy => 8.0,
            Difficulty::Normal => 6.0,
            Difficulty::Hard => 4.0,
        }
    }

    /// Tube radius scales with the inner radius
    pub fn ring_tube_radius(&self) -> f32 {
        self.ring_inner_radius() * 0.2
    }
}

/// Session lifecycle. `GameOver` is terminal until the next difficulty select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Menu is up, nothing has started yet
    Waiting,
    /// Active gameplay
    Playing,
    /// Run ended (time out, missed phase target, or phase-3 clear)
    GameOver,
}

/// The player aircraft. Position and orientation are owned by the movement
/// resolver; everything else reads them.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    /// Heading around the world Y axis (radians)
    pub yaw: f32,
    /// Nose elevation, clamped to +-MAX_PITCH (radians). No roll.
    pub pitch: f32,
    pub current_speed: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 20.0),
            yaw: 0.0,
            pitch: 0.0,
            current_speed: BASE_SPEED,
        }
    }
}

impl Player {
    /// Orientation quaternion: yaw about world Y, then pitch about local X
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit forward vector (-Z rotated by orientation)
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }
}

/// A static circular collider in the XZ plane (buildings and towers)
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    /// Center in the XZ plane (x, z)
    pub center: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(x: f32, z: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, z),
            radius,
        }
    }
}

/// A score ring floating in the air
#[derive(Debug, Clone)]
pub struct Ring {
    pub position: Vec3,
    pub inner_radius: f32,
    pub tube_radius: f32,
    pub age: f32,
    pub lifetime: f32,
    pub collected: bool,
    pub expired: bool,
}

impl Ring {
    pub fn new(position: Vec3, inner_radius: f32, tube_radius: f32) -> Self {
        Self {
            position,
            inner_radius,
            tube_radius,
            age: 0.0,
            lifetime: RING_LIFETIME,
            collected: false,
            expired: false,
        }
    }

    /// Distance at which the aircraft counts as flying through the ring
    pub fn collect_radius(&self) -> f32 {
        self.inner_radius + self.tube_radius * 0.5
    }

    /// Collected or expired rings are inert and get purged on cleanup
    pub fn is_inert(&self) -> bool {
        self.collected || self.expired
    }

    /// Age the ring; it expires if it outlives its lifetime uncollected
    pub fn step(&mut self, dt: f32) {
        if self.is_inert() {
            return;
        }
        self.age += dt;
        if self.age >= self.lifetime {
            self.expired = true;
        }
    }
}

/// A glowing orb that grants extra countdown time
#[derive(Debug, Clone)]
pub struct TimeOrb {
    pub position: Vec3,
    pub radius: f32,
    /// Pickup range, much larger than the visual radius
    pub trigger_radius: f32,
    pub age: f32,
    pub lifetime: f32,
    pub collected: bool,
    pub expired: bool,
}

impl TimeOrb {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            radius: ORB_RADIUS,
            trigger_radius: ORB_TRIGGER_RADIUS,
            age: 0.0,
            lifetime: ORB_LIFETIME,
            collected: false,
            expired: false,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.collected || self.expired
    }

    pub fn step(&mut self, dt: f32) {
        if self.is_inert() {
            return;
        }
        self.age += dt;
        if self.age >= self.lifetime {
            self.expired = true;
        }
    }
}

/// Particle count of a collection burst
pub const BURST_PARTICLE_COUNT: usize = 18;
/// Burst lifetime in seconds
pub const BURST_LIFETIME: f32 = 0.4;
/// Downward acceleration on burst particles
pub const BURST_GRAVITY: f32 = 4.0;
/// Beam lifetime in seconds
pub const BEAM_LIFETIME: f32 = 0.18;

/// One spark of a collection burst
#[derive(Debug, Clone, Copy)]
pub struct BurstParticle {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// What a transient effect looks like; the renderer reads this, the sim
/// only drives the lifecycle.
#[derive(Debug, Clone)]
pub enum EffectKind {
    /// Spherical spark burst at a collection point
    Burst { particles: Vec<BurstParticle> },
    /// Straight beam from the aircraft to a collected orb
    Beam { start: Vec3, end: Vec3 },
}

/// Fire-and-forget transient visual spawned by collection events
#[derive(Debug, Clone)]
pub struct Effect {
    pub kind: EffectKind,
    pub age: f32,
    pub lifetime: f32,
    pub done: bool,
}

impl Effect {
    /// Spark burst at `origin`, particles flung in random directions
    pub fn burst(origin: Vec3, rng: &mut Pcg32) -> Self {
        let mut particles = Vec::with_capacity(BURST_PARTICLE_COUNT);
        for _ in 0..BURST_PARTICLE_COUNT {
            let dir = Vec3::new(
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
            )
            .normalize_or_zero();
            let speed = rng.random_range(6.0..10.0);
            particles.push(BurstParticle {
                position: origin,
                velocity: dir * speed,
            });
        }
        Self {
            kind: EffectKind::Burst { particles },
            age: 0.0,
            lifetime: BURST_LIFETIME,
            done: false,
        }
    }

    /// Short-lived beam between two points
    pub fn beam(start: Vec3, end: Vec3) -> Self {
        Self {
            kind: EffectKind::Beam { start, end },
            age: 0.0,
            lifetime: BEAM_LIFETIME,
            done: false,
        }
    }

    /// Advance the effect; bursts integrate particle motion, beams just fade
    pub fn step(&mut self, dt: f32) {
        if self.done {
            return;
        }
        self.age += dt;
        if let EffectKind::Burst { particles } = &mut self.kind {
            for p in particles.iter_mut() {
                p.velocity.y -= BURST_GRAVITY * dt;
                p.position += p.velocity * dt;
            }
        }
        if self.age >= self.lifetime {
            self.done = true;
        }
    }

    /// Remaining brightness in [0, 1] for the renderer
    pub fn fade(&self) -> f32 {
        (1.0 - self.age / self.lifetime).max(0.0)
    }
}

/// Notifications the frontend drains once per frame and forwards to the
/// audio/UI collaborators. Keeping these out of the tick keeps collaborator
/// failures out of the sim.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RingCollected {
        combo: u32,
        points: u32,
        position: Vec3,
    },
    OrbCollected {
        position: Vec3,
    },
    BoostStarted,
    PhaseAdvanced {
        phase: u8,
    },
    /// Emitted exactly once per run
    GameOver {
        score: u32,
        phase: u8,
        elapsed: f32,
    },
}

/// Complete session state, advanced by `sim::tick::tick`
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub state: RunState,
    pub difficulty: Difficulty,

    pub score: u32,
    /// Countdown clock, clamped to [0, MAX_TIME]
    pub time_remaining: f32,
    /// Total time since the run started; drives the phase gates
    pub elapsed_time: f32,
    /// Scoring checkpoint 1..=3, monotonically non-decreasing
    pub phase: u8,
    /// One-shot guards so each phase boundary fires exactly once
    pub phase_checked: [bool; 3],

    pub combo_count: u32,
    pub combo_timer: f32,
    pub boost_remaining: f32,
    pub(crate) was_boosting: bool,

    pub player: Player,
    pub camera: super::camera::CameraRig,

    pub rings: Vec<Ring>,
    pub orbs: Vec<TimeOrb>,
    pub effects: Vec<Effect>,
    obstacles: Vec<Obstacle>,

    pub(crate) spawner: super::spawn::Spawner,
    pub(crate) rng: Pcg32,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Create a fresh session in the menu state
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            state: RunState::Waiting,
            difficulty: Difficulty::default(),
            score: 0,
            time_remaining: LEVEL_DURATION,
            elapsed_time: 0.0,
            phase: 1,
            phase_checked: [false; 3],
            combo_count: 0,
            combo_timer: 0.0,
            boost_remaining: BOOST_MAX,
            was_boosting: false,
            player: Player::default(),
            camera: super::camera::CameraRig::default(),
            rings: Vec::new(),
            orbs: Vec::new(),
            effects: Vec::new(),
            obstacles: Vec::new(),
            spawner: super::spawn::Spawner::default(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Register a single obstacle. Obstacles are registered during city
    /// construction and read-only once play begins.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Bulk-register obstacles
    pub fn register_obstacles<I: IntoIterator<Item = Obstacle>>(&mut self, obstacles: I) {
        self.obstacles.extend(obstacles);
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Start (or restart) a run: reset all session state, purge collectibles
    /// and effects, and pick the ring geometry for the chosen difficulty.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;

        self.score = 0;
        self.time_remaining = LEVEL_DURATION;
        self.elapsed_time = 0.0;
        self.phase = 1;
        self.phase_checked = [false; 3];
        self.combo_count = 0;
        self.combo_timer = 0.0;
        self.boost_remaining = BOOST_MAX;
        self.was_boosting = false;

        self.rings.clear();
        self.orbs.clear();
        self.effects.clear();
        self.events.clear();
        self.spawner.reset();

        log::info!("Run started: difficulty={}", difficulty.as_str());
        self.state = RunState::Playing;
    }

    /// Ring geometry currently in effect (set by difficulty)
    pub fn ring_inner_radius(&self) -> f32 {
        self.difficulty.ring_inner_radius()
    }

    pub fn ring_tube_radius(&self) -> f32 {
        self.difficulty.ring_tube_radius()
    }

    /// Score target for the current phase
    pub fn phase_target(&self) -> u32 {
        PHASE_TARGETS[(self.phase as usize - 1).min(2)]
    }

    /// Seconds until the current phase boundary (60/120/180)
    pub fn phase_time_remaining(&self) -> f32 {
        let phase_end = self.phase as f32 * PHASE_DURATION;
        (phase_end - self.elapsed_time).max(0.0)
    }

    /// End the run. Idempotent: only the first call emits the event.
    pub(crate) fn end_game(&mut self) {
        if self.state == RunState::GameOver {
            return;
        }
        self.state = RunState::GameOver;
        log::info!(
            "Game over: score={} phase={} elapsed={:.1}s",
            self.score,
            self.phase,
            self.elapsed_time
        );
        self.push_event(SessionEvent::GameOver {
            score: self.score,
            phase: self.phase,
            elapsed: self.elapsed_time,
        });
    }

    pub(crate) fn push_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}
