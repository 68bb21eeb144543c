//! Sound cues
//!
//! The simulation fires named cues and never waits on them. `AudioManager`
//! forwards cues over a channel to a worker thread that plays short beep
//! sequences; if there is no output device every call is a silent no-op.

use std::io::{IsTerminal, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Ball hits paddle
    PaddleHit,
    /// Ball hits top or bottom wall
    WallHit,
    /// A point was scored
    Score,
    /// Power-up collected
    PowerUpCollect,
    GameStart,
    GameOver,
}

/// One beep: frequency in Hz and length in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub freq: u32,
    pub ms: u64,
}

const fn tone(freq: u32, ms: u64) -> Tone {
    Tone { freq, ms }
}

const PADDLE_HIT: &[Tone] = &[tone(800, 50)];
const WALL_HIT: &[Tone] = &[tone(600, 50)];
const SCORE: &[Tone] = &[tone(400, 100), tone(300, 150)];
// Ascending
const POWERUP_COLLECT: &[Tone] = &[tone(500, 50), tone(700, 50), tone(900, 50)];
const GAME_START: &[Tone] = &[tone(600, 100), tone(800, 150)];
// Descending
const GAME_OVER: &[Tone] = &[tone(800, 100), tone(600, 100), tone(400, 200)];

impl Cue {
    /// Beep sequence for this cue
    pub fn tones(self) -> &'static [Tone] {
        match self {
            Cue::PaddleHit => PADDLE_HIT,
            Cue::WallHit => WALL_HIT,
            Cue::Score => SCORE,
            Cue::PowerUpCollect => POWERUP_COLLECT,
            Cue::GameStart => GAME_START,
            Cue::GameOver => GAME_OVER,
        }
    }
}

/// What the simulation needs from the sound system
pub trait SoundSink {
    /// Trigger a cue. Must return immediately.
    fn play(&mut self, cue: Cue);

    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;

    fn enable(&mut self) {
        self.set_enabled(true);
    }

    fn disable(&mut self) {
        self.set_enabled(false);
    }

    /// Flip the enabled flag and return the new value
    fn toggle(&mut self) -> bool {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled);
        enabled
    }
}

/// Something that can actually emit a tone. Runs on the audio worker thread.
pub trait ToneOutput: Send + 'static {
    fn beep(&mut self, tone: Tone) -> std::io::Result<()>;
}

/// Rings the terminal bell for each tone and holds for its duration
#[derive(Debug, Default)]
pub struct TerminalBell;

impl TerminalBell {
    /// The bell is only audible on an interactive terminal
    pub fn available() -> bool {
        std::io::stderr().is_terminal()
    }
}

impl ToneOutput for TerminalBell {
    fn beep(&mut self, tone: Tone) -> std::io::Result<()> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        drop(err);
        thread::sleep(Duration::from_millis(tone.ms));
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    tx: Option<Sender<Cue>>,
    enabled: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Open the terminal bell if there is one, otherwise stay silent
    pub fn new() -> Self {
        if TerminalBell::available() {
            Self::with_output(TerminalBell)
        } else {
            log::warn!("No terminal for audio output - audio disabled");
            Self::silent()
        }
    }

    /// A manager with no device; every cue is dropped
    pub fn silent() -> Self {
        Self {
            tx: None,
            enabled: true,
        }
    }

    /// Spawn the worker thread feeding `output`
    pub fn with_output(mut output: impl ToneOutput) -> Self {
        let (tx, rx) = mpsc::channel::<Cue>();
        let spawned = thread::Builder::new()
            .name("audio".into())
            .spawn(move || {
                for cue in rx {
                    for &tone in cue.tones() {
                        if let Err(e) = output.beep(tone) {
                            log::debug!("Dropped {:?}: {}", cue, e);
                            break;
                        }
                    }
                }
            });

        match spawned {
            Ok(_) => Self {
                tx: Some(tx),
                enabled: true,
            },
            Err(e) => {
                log::warn!("Failed to start audio thread ({}) - audio disabled", e);
                Self::silent()
            }
        }
    }

    /// Whether cues reach an output device
    pub fn has_device(&self) -> bool {
        self.tx.is_some()
    }
}

impl SoundSink for AudioManager {
    fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        let Some(tx) = &self.tx else { return };
        if tx.send(cue).is_err() {
            // Worker is gone; stop trying
            log::debug!("Audio worker stopped - audio disabled");
            self.tx = None;
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
