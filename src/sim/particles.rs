//! Decorative particle bursts
//!
//! Particles never feed back into gameplay. They are spawned in bursts,
//! fall under a constant gravity and are dropped once their lifetime runs out.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A single spark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Ticks remaining
    pub lifetime: u32,
    pub max_lifetime: u32,
    /// Size at full life
    pub size: f32,
    pub active: bool,
}

impl Particle {
    /// Spawn at `pos` with a random heading, speed, lifetime and size
    pub fn spawn(pos: Vec2, color: u32, rng: &mut impl Rng) -> Self {
        let angle = rng.random_range(0.0..TAU);
        let speed = rng.random_range(PARTICLE_SPEED_MIN..=PARTICLE_SPEED_MAX);
        let lifetime = rng.random_range(PARTICLE_LIFETIME_MIN..=PARTICLE_LIFETIME_MAX);

        Self {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            color,
            lifetime,
            max_lifetime: lifetime,
            size: rng.random_range(PARTICLE_SIZE_MIN..=PARTICLE_SIZE_MAX),
            active: true,
        }
    }

    pub fn update(&mut self, gravity: f32) {
        if !self.active {
            return;
        }

        self.pos += self.vel;
        self.vel.y += gravity;

        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            self.active = false;
        }
    }

    /// Remaining life in [0, 1]; drives both opacity and size
    pub fn life_fraction(&self) -> f32 {
        if self.max_lifetime == 0 {
            return 0.0;
        }
        self.lifetime as f32 / self.max_lifetime as f32
    }

    pub fn render_size(&self) -> f32 {
        self.size * self.life_fraction()
    }
}

/// Owns every live particle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, pos: Vec2, color: u32, count: usize, rng: &mut impl Rng) {
        self.particles.reserve(count);
        for _ in 0..count {
            self.particles.push(Particle::spawn(pos, color, rng));
        }
    }

    /// Advance every particle, then drop the expired ones
    pub fn update(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.update(PARTICLE_GRAVITY);
        }
        self.particles.retain(|p| p.active);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
