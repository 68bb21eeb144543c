//! Collision detection and response
//!
//! Everything here is axis-aligned: entities are boxes, walls are the top and
//! bottom of the arena, goals are its left and right edges. Nothing sweeps,
//! so a fast enough ball can pass through a paddle in a single tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Ball, Entity, Paddle, Player};

/// Axis-aligned bounding box (screen coordinates, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn from_top_left(pos: Vec2, size: Vec2) -> Self {
        Self {
            left: pos.x,
            top: pos.y,
            right: pos.x + size.x,
            bottom: pos.y + size.y,
        }
    }

    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::from_top_left(center - size / 2.0, size)
    }

    /// True unless strictly separated on some axis; touching edges collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }
}

/// Overlap test between any two entities
pub fn collides(a: &impl Entity, b: &impl Entity) -> bool {
    a.bounds().overlaps(&b.bounds())
}

/// Which horizontal wall the ball bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Top,
    Bottom,
}

/// Keep the ball inside the arena vertically.
///
/// Clamps the ball back onto the boundary and flips its vertical velocity.
/// Returns the wall it touched, if any.
pub fn resolve_wall_collision(ball: &mut Ball, arena_height: f32) -> Option<Wall> {
    let y = ball.pos().y;
    let radius = ball.radius();

    if y - radius < 0.0 {
        ball.set_y(radius);
        ball.reverse_y();
        return Some(Wall::Top);
    }

    if y + radius > arena_height {
        ball.set_y(arena_height - radius);
        ball.reverse_y();
        return Some(Wall::Bottom);
    }

    None
}

/// Whether the ball's horizontal velocity points at this paddle
pub fn approaching(ball: &Ball, paddle: &Paddle) -> bool {
    match paddle.owner() {
        Player::One => ball.vel().x < 0.0,
        Player::Two => ball.vel().x > 0.0,
    }
}

/// Bounce the ball off `paddle` if it is moving toward it and overlapping.
///
/// The direction check stops a slow ball that is still overlapping after a
/// bounce from being bounced again on the next tick.
pub fn resolve_paddle_collision(ball: &mut Ball, paddle: &Paddle) -> bool {
    if !approaching(ball, paddle) || !collides(&*ball, paddle) {
        return false;
    }
    ball.bounce_off_paddle(paddle);
    true
}

/// The player who scores if the ball has left the arena horizontally
pub fn check_goal(ball: &Ball, arena_width: f32) -> Option<Player> {
    let x = ball.pos().x;
    if x < 0.0 {
        Some(Player::Two)
    } else if x > arena_width {
        Some(Player::One)
    } else {
        None
    }
}
