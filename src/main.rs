//! Arcade Pong entry point
//!
//! Headless native driver. Key names arrive on stdin one per line (`w`,
//! `down`, `space`, `enter`...); a leading `-` releases the key and `quit`
//! exits. The match runs on a `TimerQueue` fed with wall-clock time and is
//! drawn as ASCII or as JSON lines on stdout.

use std::env;
use std::io::{self, BufRead, IsTerminal};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use arcade_pong::audio::{AudioManager, SoundSink};
use arcade_pong::platform::{InputEvent, KeyMap, TimerQueue};
use arcade_pong::renderer::{JsonRenderer, Renderer, TextRenderer};
use arcade_pong::sim::{Match, Phase, Player};
use arcade_pong::{ConfigError, MatchConfig, RenderMode, Settings};

/// Longest the loop sleeps, so input stays responsive between ticks
const MAX_SLEEP: Duration = Duration::from_millis(5);

#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error("invalid match configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("output error: {0}")]
    Io(#[from] io::Error),
}

/// Command-line overrides on top of the saved settings
#[derive(Debug, Default)]
struct Args {
    render: Option<RenderMode>,
    mute: bool,
    seed: Option<u64>,
}

fn print_usage() {
    eprintln!("Usage: arcade-pong [--render text|json] [--json] [--mute] [--seed N]");
    eprintln!();
    eprintln!("Reads key names from stdin, one per line. Prefix with '-' to release.");
    eprintln!("  Player 1: w / s      Player 2: up / down");
    eprintln!("  enter: start        space: pause        esc: menu        m: sound");
    eprintln!("  quit: exit");
}

/// Parse command line arguments, or None if invalid or help was requested
fn parse_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--json" => parsed.render = Some(RenderMode::Json),
            "--render" => {
                i += 1;
                let Some(mode) = args.get(i).and_then(|s| RenderMode::parse(s)) else {
                    eprintln!("Error: --render needs 'text' or 'json'");
                    return None;
                };
                parsed.render = Some(mode);
            }
            "--mute" => parsed.mute = true,
            "--seed" => {
                i += 1;
                let Some(seed) = args.get(i).and_then(|s| s.parse().ok()) else {
                    eprintln!("Error: --seed needs an unsigned integer");
                    return None;
                };
                parsed.seed = Some(seed);
            }
            "--help" | "-h" => {
                print_usage();
                return None;
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                return None;
            }
        }
        i += 1;
    }

    Some(parsed)
}

/// One line of stdin
enum Line {
    Press(String),
    Release(String),
    Quit,
}

fn parse_line(line: &str) -> Option<Line> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
        return Some(Line::Quit);
    }
    match line.strip_prefix('-') {
        Some(key) => Some(Line::Release(key.to_string())),
        None => Some(Line::Press(line.to_string())),
    }
}

/// Read stdin on its own thread so the loop never blocks on input
fn spawn_input() -> io::Result<Receiver<Line>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new().name("input".into()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let Some(parsed) = parse_line(&line) else {
                continue;
            };
            if tx.send(parsed).is_err() {
                break;
            }
        }
    })?;
    Ok(rx)
}

fn run(args: Args) -> Result<(), DriverError> {
    let settings_path = Settings::default_path();
    let mut settings = Settings::load(&settings_path);
    if let Some(mode) = args.render {
        settings.render = mode;
    }
    let seed = args.seed.or(settings.seed).unwrap_or_else(rand::random);
    log::info!("Arcade Pong starting (seed {}, {} output)", seed, settings.render.as_str());

    let mut audio = AudioManager::new();
    if args.mute || !settings.sound_enabled {
        audio.disable();
    }
    let sound_at_start = audio.is_enabled();

    let mut game = Match::new(MatchConfig::default(), seed, audio, TimerQueue::new())?;

    let mut renderer: Box<dyn Renderer> = match settings.render {
        RenderMode::Text => Box::new(
            TextRenderer::new(io::stdout()).with_clear_screen(io::stdout().is_terminal()),
        ),
        RenderMode::Json => Box::new(JsonRenderer::new(io::stdout())),
    };

    let keys = KeyMap::default();
    let input = spawn_input()?;
    let interval = u64::from(settings.render_interval());

    let clock = Instant::now();
    let mut rendered_tick = game.ticks();
    let mut dirty = true;

    'run: loop {
        // Input
        loop {
            let line = match input.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => break,
                // stdin closed
                Err(TryRecvError::Disconnected) => break 'run,
            };
            let event = match line {
                Line::Quit => break 'run,
                Line::Press(key) => keys.press(&key),
                Line::Release(key) => keys.release(&key),
            };
            match event {
                Some(InputEvent::Steer(player, intent)) => game.steer(player, intent),
                Some(InputEvent::Command(command)) => {
                    game.command(command);
                    dirty = true;
                }
                None => log::debug!("Unbound input"),
            }
        }

        // Timers
        let fired = game.scheduler_mut().advance_to(clock.elapsed());
        for id in fired {
            game.on_timer(id);
        }

        // Render
        let ticks = game.ticks();
        if dirty || (game.phase() == Phase::Playing && ticks >= rendered_tick + interval) {
            renderer.render(&game.snapshot())?;
            rendered_tick = ticks;
            dirty = false;
        }

        let queue = game.scheduler();
        let wait = queue
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(queue.now()))
            .unwrap_or(MAX_SLEEP)
            .min(MAX_SLEEP);
        thread::sleep(wait);
    }

    if game.sound().is_enabled() != sound_at_start {
        settings.sound_enabled = game.sound().is_enabled();
        settings.save(&settings_path);
    }
    log::info!(
        "Exiting after {} ticks ({}-{})",
        game.ticks(),
        game.score(Player::One),
        game.score(Player::Two)
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let Some(args) = parse_args() else {
        std::process::exit(2);
    };

    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
