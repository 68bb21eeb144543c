//! Match state and the menu/playing/paused/game-over state machine
//!
//! The `Match` exclusively owns every entity. It holds the handles of the
//! timers it asked for and cancels them whenever play stops, so a late
//! callback can never touch a match that has moved on.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Ball, Intent, Paddle, Player};
use super::particles::ParticleSystem;
use super::powerup::PowerUpManager;
use crate::audio::{Cue, SoundSink};
use crate::config::{ConfigError, MatchConfig};
use crate::platform::{Scheduler, TimerId};

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen, nothing simulated
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen mid-match
    Paused,
    /// Someone reached the winning score
    GameOver,
}

/// Discrete commands from the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    TogglePause,
    /// Start from the menu, or rematch after game over
    Confirm,
    /// Abort to the menu
    Cancel,
    ToggleSound,
}

/// PCG stream for gameplay randomness
const GAMEPLAY_STREAM: u64 = 0x0a02_bdbf_7bb3_c0a7;
/// PCG stream for decorative particles, kept apart so effects never shift
/// gameplay rolls
const EFFECTS_STREAM: u64 = 0x5851_f42d_4c95_7f2d;

/// RNG seed wrapper
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn gameplay(&self) -> Pcg32 {
        Pcg32::new(self.seed, GAMEPLAY_STREAM)
    }

    pub fn effects(&self) -> Pcg32 {
        Pcg32::new(self.seed, EFFECTS_STREAM)
    }
}

/// A full two-player match
pub struct Match<S: SoundSink, T: Scheduler> {
    pub(crate) config: MatchConfig,
    pub(crate) rng: Pcg32,
    pub(crate) fx_rng: Pcg32,
    pub(crate) phase: Phase,
    pub(crate) scores: [u32; 2],
    pub(crate) winner: Option<Player>,
    pub(crate) ball: Ball,
    pub(crate) paddles: [Paddle; 2],
    pub(crate) powerups: PowerUpManager,
    pub(crate) particles: ParticleSystem,
    pub(crate) sound: S,
    pub(crate) scheduler: T,
    /// Repeating simulation timer while Playing
    pub(crate) tick_timer: Option<TimerId>,
    /// Pending one-shot that re-activates a served ball
    pub(crate) serve_timer: Option<TimerId>,
    /// Ball is parked at center waiting for the serve delay
    pub(crate) awaiting_serve: bool,
    pub(crate) ticks: u64,
}

impl<S: SoundSink, T: Scheduler> Match<S, T> {
    /// Build a match in the menu. Rejects invalid configurations.
    pub fn new(
        config: MatchConfig,
        seed: u64,
        sound: S,
        scheduler: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng_state = RngState::new(seed);
        let mut rng = rng_state.gameplay();
        let ball = Ball::new(
            Self::center(&config),
            config.ball_radius,
            config.ball_speed,
            &mut rng,
        );
        let paddles = Player::BOTH.map(|player| {
            Paddle::new(
                player,
                Self::paddle_start(&config, player),
                Vec2::new(config.paddle_width, config.paddle_height),
                config.paddle_speed,
                config.arena_height,
            )
        });

        Ok(Self {
            config,
            rng,
            fx_rng: rng_state.effects(),
            phase: Phase::Menu,
            scores: [0; 2],
            winner: None,
            ball,
            paddles,
            powerups: PowerUpManager::new(),
            particles: ParticleSystem::new(),
            sound,
            scheduler,
            tick_timer: None,
            serve_timer: None,
            awaiting_serve: false,
            ticks: 0,
        })
    }

    fn center(config: &MatchConfig) -> Vec2 {
        Vec2::new(config.arena_width / 2.0, config.arena_height / 2.0)
    }

    fn paddle_start(config: &MatchConfig, player: Player) -> Vec2 {
        Vec2::new(
            config.paddle_x(player == Player::One),
            config.paddle_start_y(),
        )
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self, player: Player) -> &Paddle {
        &self.paddles[player.index()]
    }

    pub fn powerups(&self) -> &PowerUpManager {
        &self.powerups
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Simulation ticks run since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    /// The host polls this for fired timers and feeds them to `on_timer`
    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    /// Apply a paddle intent. Takes effect on the next tick's movement.
    pub fn steer(&mut self, player: Player, intent: Intent) {
        self.paddles[player.index()].steer(intent);
    }

    /// Handle a discrete command; commands that make no sense in the current
    /// phase are ignored
    pub fn command(&mut self, command: Command) {
        match (command, self.phase) {
            (Command::ToggleSound, _) => {
                let enabled = self.sound.toggle();
                log::info!("Sound {}", if enabled { "on" } else { "off" });
            }
            (Command::Start | Command::Confirm, Phase::Menu) => self.begin_play(),
            (Command::Confirm, Phase::GameOver) => {
                self.reset();
                self.begin_play();
            }
            (Command::TogglePause, Phase::Playing) => self.pause(),
            (Command::TogglePause, Phase::Paused) => self.resume(),
            (Command::Cancel, Phase::Playing | Phase::Paused | Phase::GameOver) => {
                self.back_to_menu()
            }
            _ => log::trace!("Ignored {:?} in {:?}", command, self.phase),
        }
    }

    fn begin_play(&mut self) {
        self.phase = Phase::Playing;
        self.sound.play(Cue::GameStart);
        self.start_ticking();
        log::info!("Match started");
    }

    fn pause(&mut self) {
        self.phase = Phase::Paused;
        self.stop_timers();
        log::info!("Paused");
    }

    fn resume(&mut self) {
        self.phase = Phase::Playing;
        self.start_ticking();
        if self.awaiting_serve {
            // The serve delay starts over after a pause
            self.schedule_serve();
        }
        log::info!("Resumed");
    }

    fn back_to_menu(&mut self) {
        self.stop_timers();
        self.phase = Phase::Menu;
        self.reset();
        log::info!("Back to menu");
    }

    /// Record the winner and stop the loop
    pub(crate) fn finish(&mut self, winner: Player) {
        self.phase = Phase::GameOver;
        self.winner = Some(winner);
        self.stop_timers();
        self.sound.play(Cue::GameOver);
        log::info!(
            "Player {} wins {}-{}",
            winner.number(),
            self.scores[0],
            self.scores[1]
        );
    }

    /// Scores to zero, entities to their start positions, power-ups and
    /// particles cleared, timers cancelled. Leaves the phase alone.
    pub(crate) fn reset(&mut self) {
        self.stop_timers();
        self.awaiting_serve = false;

        self.scores = [0; 2];
        self.winner = None;

        let center = Self::center(&self.config);
        self.ball.reset_position(center, &mut self.rng);
        self.ball.set_active(true);
        for player in Player::BOTH {
            let start = Self::paddle_start(&self.config, player);
            self.paddles[player.index()].reset_position(start);
        }

        self.powerups.clear();
        self.particles.clear();
    }

    fn start_ticking(&mut self) {
        if let Some(old) = self.tick_timer.take() {
            self.scheduler.cancel(old);
        }
        self.tick_timer = Some(self.scheduler.every(self.config.tick_period()));
    }

    pub(crate) fn schedule_serve(&mut self) {
        if let Some(old) = self.serve_timer.take() {
            self.scheduler.cancel(old);
        }
        self.serve_timer = Some(self.scheduler.after(self.config.respawn_delay()));
    }

    /// Cancel the tick loop and any pending serve. `awaiting_serve` survives
    /// so a resume can re-arm the serve.
    fn stop_timers(&mut self) {
        if let Some(id) = self.tick_timer.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.serve_timer.take() {
            self.scheduler.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingSink;
    use crate::platform::TimerQueue;

    fn new_match() -> Match<RecordingSink, TimerQueue> {
        Match::new(
            MatchConfig::default(),
            1234,
            RecordingSink::default(),
            TimerQueue::new(),
        )
        .expect("default config is valid")
    }

    #[test]
    fn test_starts_in_menu() {
        let game = new_match();
        assert_eq!(game.phase(), Phase::Menu);
        assert_eq!(game.score(Player::One), 0);
        assert_eq!(game.score(Player::Two), 0);
        assert_eq!(game.ball().pos(), Vec2::new(400.0, 300.0));
        assert_eq!(game.paddle(Player::One).pos(), Vec2::new(30.0, 250.0));
        assert_eq!(game.paddle(Player::Two).pos(), Vec2::new(755.0, 250.0));
        assert_eq!(game.scheduler().pending(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MatchConfig {
            arena_height: -1.0,
            ..Default::default()
        };
        let result = Match::new(config, 1, RecordingSink::default(), TimerQueue::new());
        assert!(matches!(result, Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn test_start_arms_tick_loop() {
        let mut game = new_match();
        game.command(Command::Start);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.sound().cues, vec![Cue::GameStart]);
        assert_eq!(game.scheduler().pending(), 1);

        // Start again while playing does nothing
        game.command(Command::Start);
        assert_eq!(game.scheduler().pending(), 1);
        assert_eq!(game.sound().count(Cue::GameStart), 1);
    }

    #[test]
    fn test_confirm_starts_from_menu() {
        let mut game = new_match();
        game.command(Command::Confirm);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_pause_cancels_timers() {
        let mut game = new_match();
        game.command(Command::Start);
        game.command(Command::TogglePause);
        assert_eq!(game.phase(), Phase::Paused);
        assert_eq!(game.scheduler().pending(), 0);

        game.command(Command::TogglePause);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.scheduler().pending(), 1);
    }

    #[test]
    fn test_pause_ignored_outside_play() {
        let mut game = new_match();
        game.command(Command::TogglePause);
        assert_eq!(game.phase(), Phase::Menu);
    }

    #[test]
    fn test_cancel_returns_to_menu_and_resets() {
        let mut game = new_match();
        game.command(Command::Start);
        game.scores = [3, 2];
        game.steer(Player::One, Intent::Down);

        game.command(Command::Cancel);
        assert_eq!(game.phase(), Phase::Menu);
        assert_eq!(game.scores, [0, 0]);
        assert_eq!(game.paddle(Player::One).vel_y(), 0.0);
        assert_eq!(game.scheduler().pending(), 0);

        // Cancel in the menu is a no-op
        game.command(Command::Cancel);
        assert_eq!(game.phase(), Phase::Menu);
    }

    #[test]
    fn test_toggle_sound_any_phase() {
        let mut game = new_match();
        game.command(Command::ToggleSound);
        assert!(!game.sound().is_enabled());
        game.command(Command::Start);
        assert!(game.sound().cues.is_empty());
        game.command(Command::ToggleSound);
        assert!(game.sound().is_enabled());
    }

    #[test]
    fn test_rng_streams_differ() {
        use rand::Rng;
        let state = RngState::new(77);
        let a: u64 = state.gameplay().random();
        let b: u64 = state.effects().random();
        assert_ne!(a, b);
        let again: u64 = RngState::new(77).gameplay().random();
        assert_eq!(a, again);
    }
}
