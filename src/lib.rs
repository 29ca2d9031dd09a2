//! Neon Rush - a cyberpunk flying arcade game
//!
//! Core modules:
//! - `sim`: Deterministic gameplay simulation (session state machine, movement,
//!   spawning, collisions, camera)
//! - `world`: City obstacle layout
//! - `settings`: Player preferences
//! - `audio` / `ui`: Browser collaborators (Web Audio synth, DOM HUD)

pub mod settings;
pub mod sim;
pub mod world;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod ui;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Cruise speed of the aircraft (units/sec)
    pub const BASE_SPEED: f32 = 30.0;
    /// Speed multiplier while boosting
    pub const BOOST_MULTIPLIER: f32 = 2.0;
    /// Boost fuel capacity (seconds of boost)
    pub const BOOST_MAX: f32 = 5.0;
    /// Boost fuel drain while active (units/sec)
    pub const BOOST_DRAIN_RATE: f32 = 1.0;
    /// Boost fuel regeneration while idle (units/sec)
    pub const BOOST_REGEN_RATE: f32 = 0.4;

    /// Yaw rate (radians/sec)
    pub const TURN_SPEED: f32 = 3.0;
    /// Pitch rate (radians/sec)
    pub const PITCH_SPEED: f32 = 2.2;
    /// Pitch is clamped to keep the aircraft from looping
    pub const MAX_PITCH: f32 = 0.95;
    /// Vertical thruster speed as a fraction of base speed
    pub const VERTICAL_SPEED_FACTOR: f32 = 0.8;
    /// Collision radius of the aircraft in the XZ plane
    pub const AIRCRAFT_RADIUS: f32 = 1.5;

    /// World bounds: |x| <= REGION_X, |z| <= REGION_Z
    pub const REGION_X: f32 = 60.0;
    pub const REGION_Z: f32 = 60.0;
    /// Flight floor and ceiling
    pub const Y_MIN: f32 = 3.0;
    pub const Y_MAX: f32 = 25.0;

    /// Starting countdown time (seconds)
    pub const LEVEL_DURATION: f32 = 60.0;
    /// Energy time cap - orb pickups never push the clock past this
    pub const MAX_TIME: f32 = 100.0;
    /// Seconds granted per time orb
    pub const ORB_TIME_BONUS: f32 = 5.0;

    /// Length of each scoring phase (seconds)
    pub const PHASE_DURATION: f32 = 60.0;
    /// Score required at each phase boundary (60s / 120s / 180s)
    pub const PHASE_TARGETS: [u32; 3] = [15, 30, 45];

    /// Sliding window for chained ring collections (seconds)
    pub const COMBO_WINDOW: f32 = 3.0;

    /// Ring lifetime before it expires uncollected (seconds)
    pub const RING_LIFETIME: f32 = 5.0;
    /// Ring spawn interval bounds (uniform redraw after each spawn)
    pub const RING_SPAWN_MIN: f32 = 2.0;
    pub const RING_SPAWN_MAX: f32 = 4.0;

    /// Visual radius of a time orb
    pub const ORB_RADIUS: f32 = 0.7;
    /// Pickup radius of a time orb (deliberately generous)
    pub const ORB_TRIGGER_RADIUS: f32 = 12.0;
    /// Orb lifetime before it expires uncollected (seconds)
    pub const ORB_LIFETIME: f32 = 10.0;
    /// Orb spawn interval bounds
    pub const ORB_SPAWN_MIN: f32 = 5.0;
    pub const ORB_SPAWN_MAX: f32 = 9.0;

    /// Chase-camera offset behind and above the aircraft (local space)
    pub const CAMERA_FOLLOW_OFFSET: Vec3 = Vec3::new(0.0, 3.0, 8.0);
    /// Per-tick geometric decay of the accumulated pan offset
    pub const CAMERA_PAN_DECAY: f32 = 0.92;
    /// Pan offset per pixel of middle-mouse drag
    pub const CAMERA_PAN_SPEED: f32 = 0.015;
}

/// Format seconds as M:SS for the HUD and logs
pub fn format_mmss(sec: f32) -> String {
    let s = sec.max(0.0);
    let m = (s / 60.0).floor() as u32;
    let rest = (s % 60.0).floor() as u32;
    format!("{}:{:02}", m, rest)
}
