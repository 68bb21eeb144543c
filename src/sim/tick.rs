//! Fixed timestep simulation tick
//!
//! One tick runs, in order: movement, collisions (walls, paddles,
//! power-up), scoring, power-up bookkeeping, particles. The renderer reads a
//! snapshot afterwards.

use glam::Vec2;

use super::collision::{Wall, check_goal, resolve_paddle_collision, resolve_wall_collision};
use super::entity::{Entity, Player};
use super::state::{Match, Phase};
use crate::audio::{Cue, SoundSink};
use crate::consts::*;
use crate::palette;
use crate::platform::{Scheduler, TimerId};

impl<S: SoundSink, T: Scheduler> Match<S, T> {
    /// Dispatch a fired timer.
    ///
    /// Ids the match no longer holds (cancelled by a pause, reset or game
    /// over) are ignored. Returns whether the id was recognised.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.tick_timer == Some(id) {
            self.tick();
            true
        } else if self.serve_timer == Some(id) {
            self.serve_timer = None;
            self.serve();
            true
        } else {
            log::trace!("Ignoring stale timer {:?}", id);
            false
        }
    }

    /// Advance the simulation by one tick. Does nothing unless Playing.
    pub fn tick(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.ticks += 1;

        for paddle in self.paddles.iter_mut() {
            paddle.update();
        }
        self.ball.update();

        self.check_wall_collision();
        self.check_paddle_collision();
        self.check_powerup_collection();

        self.check_scoring();

        self.powerups.update_field();
        self.powerups.tick_effect(&mut self.ball, &mut self.paddles);
        if self.phase == Phase::Playing {
            self.powerups.try_spawn(&mut self.rng, &self.config);
        }

        self.particles.update();
    }

    fn check_wall_collision(&mut self) {
        let height = self.config.arena_height;
        let Some(wall) = resolve_wall_collision(&mut self.ball, height) else {
            return;
        };

        self.sound.play(Cue::WallHit);
        let y = match wall {
            Wall::Top => 0.0,
            Wall::Bottom => height,
        };
        self.particles.emit(
            Vec2::new(self.ball.pos().x, y),
            palette::BALL,
            WALL_BURST,
            &mut self.fx_rng,
        );
    }

    /// At most one paddle bounce per tick
    fn check_paddle_collision(&mut self) {
        for paddle in self.paddles.iter() {
            if resolve_paddle_collision(&mut self.ball, paddle) {
                self.sound.play(Cue::PaddleHit);
                self.particles.emit(
                    Vec2::new(paddle.facing_x(), self.ball.pos().y),
                    paddle.owner().color(),
                    PADDLE_BURST,
                    &mut self.fx_rng,
                );
                break;
            }
        }
    }

    fn check_powerup_collection(&mut self) {
        let collected = self
            .powerups
            .try_collect(&mut self.ball, &mut self.paddles, &self.config);
        if let Some(collection) = collected {
            self.sound.play(Cue::PowerUpCollect);
            self.particles.emit(
                collection.pos,
                collection.color,
                COLLECT_BURST,
                &mut self.fx_rng,
            );
        }
    }

    fn check_scoring(&mut self) {
        let Some(scorer) = check_goal(&self.ball, self.config.arena_width) else {
            return;
        };

        let slot = &mut self.scores[scorer.index()];
        *slot = slot.saturating_add(1);
        let score = *slot;
        log::debug!(
            "Player {} scores ({}-{})",
            scorer.number(),
            self.scores[0],
            self.scores[1]
        );

        self.sound.play(Cue::Score);
        let exit_x = match scorer {
            Player::One => self.config.arena_width,
            Player::Two => 0.0,
        };
        let exit_y = self.ball.pos().y.clamp(0.0, self.config.arena_height);
        self.particles.emit(
            Vec2::new(exit_x, exit_y),
            scorer.color(),
            SCORE_BURST,
            &mut self.fx_rng,
        );

        self.park_ball();

        if score >= self.config.winning_score {
            self.finish(scorer);
        }
    }

    /// Re-center the ball and hold it still until the serve timer fires.
    /// A running speed boost stays until its countdown runs out.
    fn park_ball(&mut self) {
        let center = Vec2::new(
            self.config.arena_width / 2.0,
            self.config.arena_height / 2.0,
        );
        self.ball.recenter(center, &mut self.rng);
        self.ball.set_active(false);
        self.awaiting_serve = true;
        self.schedule_serve();
    }

    fn serve(&mut self) {
        if self.phase != Phase::Playing || !self.awaiting_serve {
            return;
        }
        self.awaiting_serve = false;
        self.ball.set_active(true);
        log::debug!("Ball served");
    }

    /// False while the ball is parked waiting for its serve delay
    pub fn ball_in_play(&self) -> bool {
        self.ball.is_active()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::audio::testing::RecordingSink;
    use crate::config::MatchConfig;
    use crate::platform::TimerQueue;
    use crate::sim::entity::{Intent, PowerUp, PowerUpKind};
    use crate::sim::state::Command;

    type TestMatch = Match<RecordingSink, TimerQueue>;

    fn new_match(config: MatchConfig, seed: u64) -> TestMatch {
        Match::new(config, seed, RecordingSink::default(), TimerQueue::new())
            .expect("valid config")
    }

    fn quiet_config() -> MatchConfig {
        MatchConfig {
            powerup_spawn_chance: 0.0,
            ..Default::default()
        }
    }

    fn started(config: MatchConfig) -> TestMatch {
        let mut game = new_match(config, 4242);
        game.command(Command::Start);
        game
    }

    /// Advance the clock by one tick period and deliver what fired
    fn step(game: &mut TestMatch) {
        let period = game.config().tick_period();
        let fired = game.scheduler_mut().advance(period);
        for id in fired {
            game.on_timer(id);
        }
    }

    fn assert_speed_invariant(game: &TestMatch) {
        let ball = game.ball();
        let expected = ball.base_speed() * ball.speed_multiplier();
        assert!(
            (ball.vel().length() - expected).abs() < 1e-3,
            "speed {} != {}",
            ball.vel().length(),
            expected
        );
    }

    fn assert_paddles_clamped(game: &TestMatch) {
        for player in Player::BOTH {
            let paddle = game.paddle(player);
            let max = game.config().arena_height - paddle.height();
            assert!(paddle.pos().y >= 0.0 && paddle.pos().y <= max + 1e-3);
        }
    }

    #[test]
    fn test_ticks_only_while_playing() {
        let mut game = new_match(quiet_config(), 1);
        let before = game.ball().clone();
        game.tick();
        assert_eq!(game.ticks(), 0);
        assert_eq!(game.ball(), &before);

        game.command(Command::Start);
        step(&mut game);
        assert_eq!(game.ticks(), 1);
        assert_ne!(game.ball().pos(), before.pos());
    }

    #[test]
    fn test_dead_center_bounce_in_match() {
        let mut game = started(quiet_config());
        game.ball.set_pos(Vec2::new(50.0, 300.0));
        game.ball.set_vel(Vec2::new(-5.0, 0.0));

        game.tick();
        assert_eq!(game.ball().vel(), Vec2::new(5.0, 0.0));
        assert_eq!(game.sound().count(Cue::PaddleHit), 1);
        assert_eq!(game.particles().len(), PADDLE_BURST);

        // Still overlapping but moving away: no second bounce
        game.tick();
        assert_eq!(game.sound().count(Cue::PaddleHit), 1);
    }

    #[test]
    fn test_wall_bounce_in_match() {
        let mut game = started(quiet_config());
        game.ball.set_pos(Vec2::new(400.0, 12.0));
        game.ball.set_vel(Vec2::new(3.0, -4.0));

        game.tick();
        assert_eq!(game.ball().pos().y, 10.0);
        assert_eq!(game.ball().vel(), Vec2::new(3.0, 4.0));
        assert_eq!(game.sound().count(Cue::WallHit), 1);
        assert_eq!(game.particles().len(), WALL_BURST);
    }

    #[test]
    fn test_score_parks_ball_then_serves() {
        let mut game = started(quiet_config());
        game.ball.set_pos(Vec2::new(2.0, 100.0));
        game.ball.set_vel(Vec2::new(-5.0, 0.0));

        step(&mut game);
        assert_eq!(game.score(Player::Two), 1);
        assert_eq!(game.score(Player::One), 0);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.sound().count(Cue::Score), 1);
        assert!(!game.ball_in_play());
        assert_eq!(game.ball().pos(), Vec2::new(400.0, 300.0));

        for _ in 0..59 {
            step(&mut game);
        }
        assert!(!game.ball_in_play());
        assert_eq!(game.ball().pos(), Vec2::new(400.0, 300.0));

        for _ in 0..3 {
            step(&mut game);
        }
        assert!(game.ball_in_play());
        assert_ne!(game.ball().pos(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_right_exit_scores_for_player_one() {
        let mut game = started(quiet_config());
        game.ball.set_pos(Vec2::new(798.0, 100.0));
        game.ball.set_vel(Vec2::new(5.0, 0.0));

        game.tick();
        assert_eq!(game.score(Player::One), 1);
        assert_eq!(game.score(Player::Two), 0);
        assert_eq!(game.particles().len(), SCORE_BURST);
    }

    #[test]
    fn test_winning_score_ends_match() {
        let mut game = started(quiet_config());
        game.scores = [0, WINNING_SCORE - 1];
        game.ball.set_pos(Vec2::new(2.0, 100.0));
        game.ball.set_vel(Vec2::new(-5.0, 0.0));

        step(&mut game);
        assert_eq!(game.score(Player::Two), WINNING_SCORE);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.winner(), Some(Player::Two));
        assert_eq!(
            game.sound().cues,
            vec![Cue::GameStart, Cue::Score, Cue::GameOver]
        );
        // Tick loop and serve both cancelled
        assert_eq!(game.scheduler().pending(), 0);

        let ticks = game.ticks();
        for _ in 0..120 {
            step(&mut game);
        }
        assert_eq!(game.ticks(), ticks);
        assert!(!game.ball_in_play());
    }

    #[test]
    fn test_rematch_resets_everything() {
        let mut game = started(quiet_config());
        game.scores = [WINNING_SCORE - 1, 2];
        game.ball.set_pos(Vec2::new(798.0, 100.0));
        game.ball.set_vel(Vec2::new(5.0, 0.0));
        game.tick();
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.winner(), Some(Player::One));

        game.command(Command::Confirm);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.scores, [0, 0]);
        assert_eq!(game.winner(), None);
        assert!(game.ball_in_play());
        assert!(game.particles().is_empty());
        assert!(game.powerups().current().is_none());
        assert_eq!(game.sound().count(Cue::GameStart), 2);

        step(&mut game);
        assert_eq!(game.ticks(), 2);
    }

    #[test]
    fn test_pause_twice_leaves_state_untouched() {
        let mut game = started(MatchConfig::default());
        for _ in 0..30 {
            step(&mut game);
        }
        let ball = game.ball().clone();
        let paddles = game.paddles.clone();
        let ticks = game.ticks();

        game.command(Command::TogglePause);
        for _ in 0..120 {
            step(&mut game);
        }
        assert_eq!(game.ball(), &ball);
        game.command(Command::TogglePause);

        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.ball(), &ball);
        assert_eq!(game.paddles, paddles);
        assert_eq!(game.ticks(), ticks);
    }

    #[test]
    fn test_pause_during_serve_rearms_delay() {
        let mut game = started(quiet_config());
        game.ball.set_pos(Vec2::new(2.0, 100.0));
        game.ball.set_vel(Vec2::new(-5.0, 0.0));
        step(&mut game);
        assert!(!game.ball_in_play());

        game.command(Command::TogglePause);
        // Well past the first serve deadline
        game.scheduler_mut().advance(Duration::from_secs(3));
        game.command(Command::TogglePause);
        assert!(!game.ball_in_play());

        for _ in 0..62 {
            step(&mut game);
        }
        assert!(game.ball_in_play());
    }

    #[test]
    fn test_stale_timers_are_ignored() {
        let mut game = started(quiet_config());
        let old_tick = game.tick_timer.expect("ticking");

        game.command(Command::Cancel);
        assert!(!game.on_timer(old_tick));
        assert_eq!(game.ticks(), 0);
        assert_eq!(game.phase(), Phase::Menu);

        // Restarting hands out a fresh id; the old one stays dead
        game.command(Command::Start);
        assert!(!game.on_timer(old_tick));
        assert_eq!(game.ticks(), 0);
    }

    #[test]
    fn test_powerup_collection_in_match() {
        let mut game = started(quiet_config());
        game.ball.set_pos(Vec2::new(400.0, 300.0));
        game.ball.set_vel(Vec2::new(5.0, 0.0));
        game.powerups
            .place(PowerUp::new(Vec2::new(410.0, 300.0), 20.0, PowerUpKind::SpeedBoost, 300));

        game.tick();
        assert!(game.powerups().current().is_none());
        assert_eq!(game.powerups().beneficiary(), Some(Player::Two));
        assert_eq!(game.sound().count(Cue::PowerUpCollect), 1);
        assert_eq!(game.particles().len(), COLLECT_BURST);
        assert_speed_invariant(&game);
        assert!((game.ball().vel().length() - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_speed_boost_survives_a_goal() {
        let mut game = started(quiet_config());
        game.ball.set_pos(Vec2::new(400.0, 300.0));
        game.ball.set_vel(Vec2::new(5.0, 0.0));
        game.powerups
            .place(PowerUp::new(Vec2::new(410.0, 300.0), 20.0, PowerUpKind::SpeedBoost, 300));
        game.tick();
        assert_eq!(game.ball().speed_multiplier(), 1.5);
        assert_eq!(game.powerups().effect_ticks(), POWERUP_EFFECT_TICKS - 1);

        // Straight out the right edge
        game.ball.set_pos(Vec2::new(798.0, 100.0));
        game.tick();
        assert_eq!(game.score(Player::One), 1);
        assert!(!game.ball_in_play());
        assert_eq!(game.ball().pos(), Vec2::new(400.0, 300.0));
        assert_eq!(game.ball().speed_multiplier(), 1.5);
        assert_speed_invariant(&game);
        assert_eq!(game.powerups().beneficiary(), Some(Player::Two));

        // Boost holds while parked until the countdown hits zero
        while game.powerups().effect_ticks() > 1 {
            game.tick();
            assert_eq!(game.ball().speed_multiplier(), 1.5);
        }
        game.tick();
        assert_eq!(game.powerups().effect_ticks(), 0);
        assert_eq!(game.ball().speed_multiplier(), 1.0);
        assert_eq!(game.powerups().beneficiary(), None);
        assert_speed_invariant(&game);
    }

    #[test]
    fn test_size_boost_expiry_restores_both_paddles() {
        let mut game = started(quiet_config());
        game.ball.set_pos(Vec2::new(400.0, 300.0));
        game.ball.set_vel(Vec2::new(-5.0, 0.0));
        game.powerups
            .place(PowerUp::new(Vec2::new(390.0, 300.0), 20.0, PowerUpKind::SizeBoost, 300));

        game.tick();
        assert_eq!(game.powerups().beneficiary(), Some(Player::One));
        assert_eq!(game.paddle(Player::One).size_multiplier(), 1.5);

        for _ in 1..POWERUP_EFFECT_TICKS - 1 {
            game.tick();
            assert_speed_invariant(&game);
        }
        assert_eq!(game.paddle(Player::One).size_multiplier(), 1.5);

        game.tick();
        assert_eq!(game.paddle(Player::One).size_multiplier(), 1.0);
        assert_eq!(game.paddle(Player::Two).size_multiplier(), 1.0);
        assert_eq!(game.paddle(Player::One).height(), 100.0);
        assert_eq!(game.ball().speed_multiplier(), 1.0);
        assert_eq!(game.powerups().beneficiary(), None);
        assert_eq!(game.score(Player::One) + game.score(Player::Two), 0);
    }

    #[test]
    fn test_spawn_never_duplicates_in_match() {
        let config = MatchConfig {
            powerup_spawn_chance: 1.0,
            ..Default::default()
        };
        let mut game = started(config);
        // A parked ball can't collect, so the field power-up stays put
        game.ball.set_active(false);
        game.tick();
        let first = game.powerups().current().cloned().expect("spawned");
        game.tick();
        let second = game.powerups().current().expect("still there");
        assert_eq!(second.pos(), first.pos());
        assert_eq!(second.lifetime(), first.lifetime() - 1);
    }

    #[test]
    fn test_same_seed_same_match() {
        let run = |seed| {
            let mut game = new_match(MatchConfig::default(), seed);
            game.command(Command::Start);
            game.steer(Player::One, Intent::Down);
            for i in 0..600 {
                if i == 200 {
                    game.steer(Player::Two, Intent::Up);
                }
                step(&mut game);
            }
            serde_json::to_string(&game.snapshot()).expect("serializable")
        };
        assert_eq!(run(99), run(99));
    }

    fn intent(code: u8) -> Intent {
        match code {
            0 => Intent::Up,
            1 => Intent::Down,
            _ => Intent::Stop,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_speed_and_paddle_invariants(
            seed in any::<u64>(),
            moves in prop::collection::vec((0u8..3, 0u8..3), 1..40),
        ) {
            let config = MatchConfig {
                powerup_spawn_chance: 0.05,
                ..Default::default()
            };
            let mut game = new_match(config, seed);
            game.command(Command::Start);

            for (left, right) in moves {
                game.steer(Player::One, intent(left));
                game.steer(Player::Two, intent(right));
                for _ in 0..20 {
                    step(&mut game);
                    assert_speed_invariant(&game);
                    assert_paddles_clamped(&game);
                    prop_assert!(game.powerups().current().is_none_or(|p| p.is_active()));
                }
                if game.phase() == Phase::GameOver {
                    break;
                }
            }
        }
    }
}
