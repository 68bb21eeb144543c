//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only, driven by an injected scheduler
//! - Seeded RNG only (separate streams for gameplay and particles)
//! - No rendering or platform dependencies beyond the sound and timer traits

pub mod collision;
pub mod entity;
pub mod particles;
pub mod powerup;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{
    Aabb, Wall, check_goal, collides, resolve_paddle_collision, resolve_wall_collision,
};
pub use entity::{Ball, Body, Entity, Intent, Paddle, Player, PowerUp, PowerUpKind};
pub use particles::{Particle, ParticleSystem};
pub use powerup::{Collection, PowerUpManager};
pub use snapshot::{BallView, EffectView, PaddleView, ParticleView, PowerUpView, Snapshot};
pub use state::{Command, Match, Phase, RngState};
