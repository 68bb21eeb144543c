//! Power-up lifecycle: spawn roll, collection, timed effect and expiry

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::collides;
use super::entity::{Ball, Entity, Paddle, Player, PowerUp, PowerUpKind};
use crate::config::MatchConfig;

/// What happened when the ball picked up a power-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collection {
    pub kind: PowerUpKind,
    pub beneficiary: Player,
    pub pos: Vec2,
    pub color: u32,
}

/// Tracks the single field power-up and the single running effect
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpManager {
    /// At most one on the field
    current: Option<PowerUp>,
    beneficiary: Option<Player>,
    /// Ticks left on the running effect (0 = none)
    effect_ticks: u32,
}

impl PowerUpManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&PowerUp> {
        self.current.as_ref()
    }

    pub fn beneficiary(&self) -> Option<Player> {
        self.beneficiary
    }

    pub fn effect_ticks(&self) -> u32 {
        self.effect_ticks
    }

    /// Roll for a new power-up. Never spawns while one exists.
    pub fn try_spawn(&mut self, rng: &mut impl Rng, config: &MatchConfig) -> bool {
        if self.current.is_some() {
            return false;
        }
        if rng.random::<f32>() >= config.powerup_spawn_chance {
            return false;
        }

        let powerup = PowerUp::spawn_random(
            rng,
            config.arena_width,
            config.arena_height,
            config.powerup_size,
            config.powerup_lifetime_ticks,
        );
        log::debug!("Spawned {:?} at {:?}", powerup.kind(), powerup.pos());
        self.current = Some(powerup);
        true
    }

    /// Collect the field power-up if the ball overlaps it.
    ///
    /// The beneficiary is whoever the ball is heading toward: moving right
    /// credits player two, moving left (or not at all) credits player one.
    /// Any effect still running is cleared before the new one is applied.
    pub fn try_collect(
        &mut self,
        ball: &mut Ball,
        paddles: &mut [Paddle; 2],
        config: &MatchConfig,
    ) -> Option<Collection> {
        if !ball.is_active() {
            return None;
        }
        let powerup = self.current.as_mut()?;
        if !powerup.is_active() || powerup.is_collected() || !collides(&*ball, &*powerup) {
            return None;
        }

        powerup.collect();
        let collection = Collection {
            kind: powerup.kind(),
            beneficiary: if ball.vel().x > 0.0 {
                Player::Two
            } else {
                Player::One
            },
            pos: powerup.pos(),
            color: powerup.body().color,
        };
        self.current = None;

        Self::clear_effects(ball, paddles);
        match collection.kind {
            PowerUpKind::SpeedBoost => ball.set_speed_boost(config.boost_multiplier),
            PowerUpKind::SizeBoost => {
                paddles[collection.beneficiary.index()].set_size_boost(config.boost_multiplier)
            }
        }
        self.beneficiary = Some(collection.beneficiary);
        self.effect_ticks = config.powerup_effect_ticks;

        log::debug!(
            "Player {} collected {:?}",
            collection.beneficiary.number(),
            collection.kind
        );
        Some(collection)
    }

    /// Advance the field power-up's animation and lifetime, despawning it
    /// when it runs out
    pub fn update_field(&mut self) {
        if let Some(powerup) = self.current.as_mut() {
            powerup.update();
            if !powerup.is_active() {
                log::debug!("{:?} despawned uncollected", powerup.kind());
                self.current = None;
            }
        }
    }

    /// Count down the running effect. Returns true on the tick it expires.
    pub fn tick_effect(&mut self, ball: &mut Ball, paddles: &mut [Paddle; 2]) -> bool {
        if self.effect_ticks == 0 {
            return false;
        }
        self.effect_ticks -= 1;
        if self.effect_ticks > 0 {
            return false;
        }

        Self::clear_effects(ball, paddles);
        self.beneficiary = None;
        log::debug!("Power-up effect expired");
        true
    }

    /// Restores the ball and both paddles regardless of which effect ran
    fn clear_effects(ball: &mut Ball, paddles: &mut [Paddle; 2]) {
        ball.reset_speed_boost();
        for paddle in paddles.iter_mut() {
            paddle.reset_size_boost();
        }
    }

    /// Drop the field power-up and any effect bookkeeping
    pub fn clear(&mut self) {
        self.current = None;
        self.beneficiary = None;
        self.effect_ticks = 0;
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, powerup: PowerUp) {
        self.current = Some(powerup);
    }
}
