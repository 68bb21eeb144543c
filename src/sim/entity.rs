//! Gameplay entities: ball, paddles and power-ups
//!
//! Every entity carries a `Body` (position, size, color, active flag) and
//! adds its own movement rules on top. Ball and power-up positions are their
//! centers; a paddle's position is its top-left corner.

use std::f32::consts::{FRAC_PI_3, FRAC_PI_4};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::palette;

/// One of the two players. Player one defends the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// Horizontal direction a ball leaves this player's paddle in
    pub fn serve_direction(self) -> f32 {
        match self {
            Player::One => 1.0,
            Player::Two => -1.0,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            Player::One => palette::PLAYER_ONE,
            Player::Two => palette::PLAYER_TWO,
        }
    }

    /// 1-based number for display
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Shared positional record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub active: bool,
}

/// Capabilities common to everything that takes part in collisions
pub trait Entity {
    fn body(&self) -> &Body;

    /// Axis-aligned box used for overlap tests
    fn bounds(&self) -> Aabb;

    /// Advance one tick
    fn update(&mut self);

    fn is_active(&self) -> bool {
        self.body().active
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    body: Body,
    radius: f32,
    vel: Vec2,
    base_speed: f32,
    /// Current speed (base_speed * speed_multiplier unless raised by `increase_speed`)
    speed: f32,
    speed_multiplier: f32,
}

impl Ball {
    pub fn new(center: Vec2, radius: f32, base_speed: f32, rng: &mut impl Rng) -> Self {
        let mut ball = Self {
            body: Body {
                pos: center,
                size: Vec2::splat(radius * 2.0),
                color: palette::BALL,
                active: true,
            },
            radius,
            vel: Vec2::ZERO,
            base_speed,
            speed: base_speed,
            speed_multiplier: 1.0,
        };
        ball.reset_velocity(rng);
        ball
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn vel(&self) -> Vec2 {
        self.vel
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.body.pos = pos;
    }

    pub fn set_y(&mut self, y: f32) {
        self.body.pos.y = y;
    }

    pub fn set_active(&mut self, active: bool) {
        self.body.active = active;
    }

    /// Launch in a random direction within ±45° of horizontal
    pub fn reset_velocity(&mut self, rng: &mut impl Rng) {
        let angle = rng.random_range(-FRAC_PI_4..=FRAC_PI_4);
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.vel = Vec2::new(
            direction * self.speed * angle.cos(),
            self.speed * angle.sin(),
        );
    }

    /// Scale speed to `base_speed * multiplier`, keeping the heading
    pub fn set_speed_boost(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
        self.speed = self.base_speed * multiplier;
        self.normalize_velocity();
    }

    pub fn reset_speed_boost(&mut self) {
        self.set_speed_boost(1.0);
    }

    /// Raise speed for rally-based progression
    pub fn increase_speed(&mut self, increment: f32) {
        self.speed += increment;
        self.normalize_velocity();
    }

    fn normalize_velocity(&mut self) {
        let magnitude = self.vel.length();
        if magnitude > 0.0 {
            self.vel = self.vel / magnitude * self.speed;
        }
    }

    pub fn reverse_x(&mut self) {
        self.vel.x = -self.vel.x;
    }

    pub fn reverse_y(&mut self) {
        self.vel.y = -self.vel.y;
    }

    /// Send the ball away from `paddle` at an angle set by where it struck.
    ///
    /// The impact offset from the paddle center maps linearly onto ±60°.
    /// Horizontal direction comes from the paddle's side of the arena, never
    /// from the incoming velocity, so the ball always leaves the paddle.
    pub fn bounce_off_paddle(&mut self, paddle: &Paddle) {
        let half_height = paddle.height() / 2.0;
        let relative_impact =
            ((self.body.pos.y - paddle.center_y()) / half_height).clamp(-1.0, 1.0);
        let bounce_angle = relative_impact * FRAC_PI_3;
        let direction = paddle.owner().serve_direction();

        self.vel = Vec2::new(
            direction * self.speed * bounce_angle.cos(),
            self.speed * bounce_angle.sin(),
        );
    }

    /// Put the ball at `center` with a fresh launch and no boost
    pub fn reset_position(&mut self, center: Vec2, rng: &mut impl Rng) {
        self.reset_speed_boost();
        self.recenter(center, rng);
    }

    /// Put the ball at `center` with a fresh launch at its current speed.
    /// A running speed boost carries over.
    pub fn recenter(&mut self, center: Vec2, rng: &mut impl Rng) {
        self.body.pos = center;
        self.reset_velocity(rng);
    }

    #[cfg(test)]
    pub(crate) fn set_vel(&mut self, vel: Vec2) {
        self.vel = vel;
    }
}

impl Entity for Ball {
    fn body(&self) -> &Body {
        &self.body
    }

    fn bounds(&self) -> Aabb {
        Aabb::centered(self.body.pos, self.body.size)
    }

    fn update(&mut self) {
        if !self.body.active {
            return;
        }
        self.body.pos += self.vel;
    }
}

/// Directional intent supplied by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Up,
    Down,
    Stop,
}

/// A player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    body: Body,
    owner: Player,
    base_height: f32,
    speed: f32,
    vel_y: f32,
    size_multiplier: f32,
    arena_height: f32,
}

impl Paddle {
    pub fn new(owner: Player, top_left: Vec2, size: Vec2, speed: f32, arena_height: f32) -> Self {
        Self {
            body: Body {
                pos: top_left,
                size,
                color: owner.color(),
                active: true,
            },
            owner,
            base_height: size.y,
            speed,
            vel_y: 0.0,
            size_multiplier: 1.0,
            arena_height,
        }
    }

    pub fn owner(&self) -> Player {
        self.owner
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn width(&self) -> f32 {
        self.body.size.x
    }

    pub fn height(&self) -> f32 {
        self.body.size.y
    }

    pub fn base_height(&self) -> f32 {
        self.base_height
    }

    pub fn center_y(&self) -> f32 {
        self.body.pos.y + self.body.size.y / 2.0
    }

    pub fn vel_y(&self) -> f32 {
        self.vel_y
    }

    pub fn size_multiplier(&self) -> f32 {
        self.size_multiplier
    }

    /// The edge facing the arena center
    pub fn facing_x(&self) -> f32 {
        match self.owner {
            Player::One => self.body.pos.x + self.body.size.x,
            Player::Two => self.body.pos.x,
        }
    }

    pub fn move_up(&mut self) {
        self.vel_y = -self.speed;
    }

    pub fn move_down(&mut self) {
        self.vel_y = self.speed;
    }

    pub fn stop(&mut self) {
        self.vel_y = 0.0;
    }

    pub fn steer(&mut self, intent: Intent) {
        match intent {
            Intent::Up => self.move_up(),
            Intent::Down => self.move_down(),
            Intent::Stop => self.stop(),
        }
    }

    /// Scale height to `base_height * multiplier`, pulling the paddle back
    /// inside the arena if it grew past the bottom
    pub fn set_size_boost(&mut self, multiplier: f32) {
        self.size_multiplier = multiplier;
        self.body.size.y = self.base_height * multiplier;
        self.body.pos.y = self.clamp_y(self.body.pos.y);
    }

    pub fn reset_size_boost(&mut self) {
        self.set_size_boost(1.0);
    }

    /// Move to `top_left`, stop, and drop any size boost
    pub fn reset_position(&mut self, top_left: Vec2) {
        self.body.pos = top_left;
        self.stop();
        self.reset_size_boost();
    }

    /// Clamp a top-edge y into [0, arena_height - height]
    fn clamp_y(&self, y: f32) -> f32 {
        // min/max rather than clamp: never panics on a degenerate range
        y.min(self.arena_height - self.body.size.y).max(0.0)
    }

    #[cfg(test)]
    pub(crate) fn set_y(&mut self, y: f32) {
        self.body.pos.y = y;
    }
}

impl Entity for Paddle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_top_left(self.body.pos, self.body.size)
    }

    fn update(&mut self) {
        if !self.body.active {
            return;
        }
        self.body.pos.y = self.clamp_y(self.body.pos.y + self.vel_y);
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Ball speed ×1.5
    SpeedBoost,
    /// Beneficiary's paddle height ×1.5
    SizeBoost,
}

impl PowerUpKind {
    pub fn color(self) -> u32 {
        match self {
            PowerUpKind::SpeedBoost => palette::SPEED_BOOST,
            PowerUpKind::SizeBoost => palette::SIZE_BOOST,
        }
    }
}

/// A collectible floating in the middle of the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    body: Body,
    kind: PowerUpKind,
    lifetime: u32,
    /// Degrees, cosmetic
    rotation: f32,
    /// Pulse phase, cosmetic
    pulse: f32,
    collected: bool,
}

impl PowerUp {
    pub fn new(center: Vec2, size: f32, kind: PowerUpKind, lifetime: u32) -> Self {
        Self {
            body: Body {
                pos: center,
                size: Vec2::splat(size),
                color: kind.color(),
                active: true,
            },
            kind,
            lifetime,
            rotation: 0.0,
            pulse: 0.0,
            collected: false,
        }
    }

    /// Random kind, placed in the central 40-60% width / 20-80% height band
    pub fn spawn_random(
        rng: &mut impl Rng,
        arena_width: f32,
        arena_height: f32,
        size: f32,
        lifetime: u32,
    ) -> Self {
        let x = rng.random_range(arena_width * 0.4..=arena_width * 0.6);
        let y = rng.random_range(arena_height * 0.2..=arena_height * 0.8);
        let kind = if rng.random_bool(0.5) {
            PowerUpKind::SpeedBoost
        } else {
            PowerUpKind::SizeBoost
        };
        Self::new(Vec2::new(x, y), size, kind, lifetime)
    }

    pub fn kind(&self) -> PowerUpKind {
        self.kind
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn size(&self) -> f32 {
        self.body.size.x
    }

    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Render scale from the pulse animation
    pub fn pulse_scale(&self) -> f32 {
        1.0 + self.pulse.sin() * 0.2
    }

    pub fn collect(&mut self) {
        self.collected = true;
        self.body.active = false;
    }
}

impl Entity for PowerUp {
    fn body(&self) -> &Body {
        &self.body
    }

    fn bounds(&self) -> Aabb {
        Aabb::centered(self.body.pos, self.body.size)
    }

    fn update(&mut self) {
        if !self.body.active || self.collected {
            return;
        }

        self.rotation = (self.rotation + 2.0) % 360.0;
        self.pulse += 0.1;

        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            self.body.active = false;
        }
    }
}
