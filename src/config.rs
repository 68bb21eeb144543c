//! Match configuration
//!
//! Built once at startup from `consts` and handed to the `Match`. Nothing in
//! here changes while a match is running.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a configuration is rejected at construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    #[error("winning score must be at least 1")]
    ZeroWinningScore,
    #[error("tick rate must be at least 1 Hz")]
    ZeroTickRate,
    #[error("power-up spawn chance must be within [0, 1] (got {0})")]
    SpawnChance(f32),
    #[error("boost multiplier must be at least 1.0 (got {0})")]
    BoostMultiplier(f32),
    #[error("boosted paddle height {paddle} does not fit the arena height {arena}")]
    PaddleTooTall { paddle: f32, arena: f32 },
}

/// Immutable tunables for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_margin: f32,
    pub paddle_speed: f32,
    pub ball_radius: f32,
    pub ball_speed: f32,
    pub winning_score: u32,
    pub tick_rate: u32,
    pub respawn_delay_ms: u64,
    pub powerup_spawn_chance: f32,
    pub powerup_size: f32,
    pub powerup_lifetime_ticks: u32,
    pub powerup_effect_ticks: u32,
    pub boost_multiplier: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_margin: PADDLE_MARGIN,
            paddle_speed: PADDLE_SPEED,
            ball_radius: BALL_RADIUS,
            ball_speed: BALL_SPEED,
            winning_score: WINNING_SCORE,
            tick_rate: TICK_RATE,
            respawn_delay_ms: RESPAWN_DELAY_MS,
            powerup_spawn_chance: POWERUP_SPAWN_CHANCE,
            powerup_size: POWERUP_SIZE,
            powerup_lifetime_ticks: POWERUP_LIFETIME_TICKS,
            powerup_effect_ticks: POWERUP_EFFECT_TICKS,
            boost_multiplier: BOOST_MULTIPLIER,
        }
    }
}

impl MatchConfig {
    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_speed", self.paddle_speed),
            ("ball_radius", self.ball_radius),
            ("ball_speed", self.ball_speed),
            ("powerup_size", self.powerup_size),
        ];
        for (name, value) in positive {
            // Written this way so NaN is rejected too
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.winning_score == 0 {
            return Err(ConfigError::ZeroWinningScore);
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if !(0.0..=1.0).contains(&self.powerup_spawn_chance) {
            return Err(ConfigError::SpawnChance(self.powerup_spawn_chance));
        }
        if !(self.boost_multiplier >= 1.0) {
            return Err(ConfigError::BoostMultiplier(self.boost_multiplier));
        }

        let boosted = self.paddle_height * self.boost_multiplier;
        if boosted > self.arena_height {
            return Err(ConfigError::PaddleTooTall {
                paddle: boosted,
                arena: self.arena_height,
            });
        }

        Ok(())
    }

    /// Period of the repeating simulation timer
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    pub fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_delay_ms)
    }

    /// Left edge of a paddle for the given side
    pub fn paddle_x(&self, left: bool) -> f32 {
        if left {
            self.paddle_margin
        } else {
            self.arena_width - self.paddle_margin - self.paddle_width
        }
    }

    /// Top edge of a vertically centered paddle
    pub fn paddle_start_y(&self) -> f32 {
        self.arena_height / 2.0 - self.paddle_height / 2.0
    }
}
