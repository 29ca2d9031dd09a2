//! Deterministic gameplay simulation
//!
//! All session logic lives here. This module must stay pure and deterministic:
//! - `dt` supplied by the caller, any step size tolerated
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use camera::CameraRig;
pub use collision::{clamp_to_bounds, resolve_obstacles, within_radius};
pub use state::{
    Difficulty, Effect, EffectKind, Obstacle, Player, Ring, RunState, Session, SessionEvent,
    TimeOrb,
};
pub use tick::{TickInput, tick};
