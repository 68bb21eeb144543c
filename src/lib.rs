//! Arcade Pong - a two-player paddle game with timed power-ups
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (entities, collisions, power-ups, match flow)
//! - `config`: Validated match configuration built from `consts`
//! - `platform`: Timer scheduling and input mapping
//! - `audio`: Fire-and-forget sound cues
//! - `renderer`: Snapshot renderers for the headless driver
//! - `settings`: Persisted user preferences

pub mod audio;
pub mod config;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, MatchConfig};
pub use settings::{RenderMode, Settings};

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second
    pub const TICK_RATE: u32 = 60;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 15.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    /// Distance from the side wall to the left paddle's left edge
    pub const PADDLE_MARGIN: f32 = 30.0;
    /// Pixels per tick
    pub const PADDLE_SPEED: f32 = 7.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Pixels per tick
    pub const BALL_SPEED: f32 = 5.0;
    /// Delay before a served ball starts moving again
    pub const RESPAWN_DELAY_MS: u64 = 1000;

    pub const WINNING_SCORE: u32 = 5;

    /// Power-ups
    pub const POWERUP_SPAWN_CHANCE: f32 = 0.003;
    pub const POWERUP_SIZE: f32 = 20.0;
    /// How long an uncollected power-up stays on the field
    pub const POWERUP_LIFETIME_TICKS: u32 = 300;
    /// How long a collected effect lasts (3 seconds at 60 Hz)
    pub const POWERUP_EFFECT_TICKS: u32 = 180;
    pub const BOOST_MULTIPLIER: f32 = 1.5;

    /// Particles (decorative only)
    pub const PARTICLE_GRAVITY: f32 = 0.2;
    pub const PARTICLE_SPEED_MIN: f32 = 2.0;
    pub const PARTICLE_SPEED_MAX: f32 = 6.0;
    pub const PARTICLE_LIFETIME_MIN: u32 = 20;
    pub const PARTICLE_LIFETIME_MAX: u32 = 40;
    pub const PARTICLE_SIZE_MIN: f32 = 2.0;
    pub const PARTICLE_SIZE_MAX: f32 = 5.0;

    pub const WALL_BURST: usize = 8;
    pub const PADDLE_BURST: usize = 10;
    pub const COLLECT_BURST: usize = 20;
    pub const SCORE_BURST: usize = 30;
}

/// Entity colors as 0xRRGGBB
pub mod palette {
    pub const PLAYER_ONE: u32 = 0xFF6B6B;
    pub const PLAYER_TWO: u32 = 0x4ECDC4;
    pub const BALL: u32 = 0x00D4FF;
    pub const SPEED_BOOST: u32 = 0xFF6B6B;
    pub const SIZE_BOOST: u32 = 0x4ECDC4;
}
