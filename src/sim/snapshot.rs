//! Read-only view of a match for renderers
//!
//! Everything a renderer needs is copied out here so it never borrows the
//! live entities.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Player, PowerUpKind};
use super::state::{Match, Phase};
use crate::audio::SoundSink;
use crate::palette;
use crate::platform::Scheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddleView {
    pub player: Player,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub boosted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpView {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: f32,
    /// Degrees
    pub rotation: f32,
    pub scale: f32,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
    /// 1.0 when fresh, fading to 0.0
    pub opacity: f32,
}

/// The running power-up effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectView {
    pub beneficiary: Player,
    pub ticks_left: u32,
}

/// Everything visible after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub tick: u64,
    pub arena: Vec2,
    pub scores: [u32; 2],
    pub winner: Option<Player>,
    pub ball: BallView,
    pub paddles: [PaddleView; 2],
    pub powerup: Option<PowerUpView>,
    pub effect: Option<EffectView>,
    pub particles: Vec<ParticleView>,
    pub sound_enabled: bool,
    /// Overlay text for every phase except Playing
    pub banner: Option<String>,
}

impl Snapshot {
    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }
}

const MENU_BANNER: &str = "PONG\n\n\
    Player 1: W/S | Player 2: UP/DOWN\n\n\
    Press ENTER to Start\n\
    SPACE to Pause | ESC to Menu | M to Toggle Sound";

const PAUSED_BANNER: &str = "PAUSED\n\nPress SPACE to Resume";

fn banner(phase: Phase, winner: Option<Player>) -> Option<String> {
    match phase {
        Phase::Playing => None,
        Phase::Menu => Some(MENU_BANNER.to_string()),
        Phase::Paused => Some(PAUSED_BANNER.to_string()),
        Phase::GameOver => {
            let headline = match winner {
                Some(player) => format!("PLAYER {} WINS!", player.number()),
                None => "GAME OVER".to_string(),
            };
            Some(format!("{headline}\n\nPress ENTER to Play Again\nESC for Menu"))
        }
    }
}

impl<S: SoundSink, T: Scheduler> Match<S, T> {
    /// Copy out the renderable state
    pub fn snapshot(&self) -> Snapshot {
        let ball = BallView {
            pos: self.ball.pos(),
            radius: self.ball.radius(),
            color: palette::BALL,
            active: self.ball.is_active(),
        };

        let paddles = Player::BOTH.map(|player| {
            let paddle = &self.paddles[player.index()];
            PaddleView {
                player,
                pos: paddle.pos(),
                size: Vec2::new(paddle.width(), paddle.height()),
                color: player.color(),
                boosted: paddle.size_multiplier() != 1.0,
            }
        });

        let powerup = self
            .powerups
            .current()
            .filter(|p| p.is_active())
            .map(|p| PowerUpView {
                kind: p.kind(),
                pos: p.pos(),
                size: p.size(),
                rotation: p.rotation(),
                scale: p.pulse_scale(),
                color: p.kind().color(),
            });

        let effect = self.powerups.beneficiary().map(|beneficiary| EffectView {
            beneficiary,
            ticks_left: self.powerups.effect_ticks(),
        });

        let particles = self
            .particles
            .iter()
            .filter(|p| p.active)
            .map(|p| ParticleView {
                pos: p.pos,
                size: p.render_size(),
                color: p.color,
                opacity: p.life_fraction(),
            })
            .collect();

        Snapshot {
            phase: self.phase,
            tick: self.ticks,
            arena: Vec2::new(self.config.arena_width, self.config.arena_height),
            scores: self.scores,
            winner: self.winner,
            ball,
            paddles,
            powerup,
            effect,
            particles,
            sound_enabled: self.sound.is_enabled(),
            banner: banner(self.phase, self.winner),
        }
    }
}
