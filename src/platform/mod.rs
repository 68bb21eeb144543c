//! Platform abstraction layer
//!
//! Handles what the simulation needs from its host:
//! - Timers (repeating tick, one-shot delays, cancellation)
//! - Input events mapped to paddle intents and match commands

pub mod input;
pub mod scheduler;

pub use input::{InputEvent, KeyMap};
pub use scheduler::{Scheduler, TimerId, TimerQueue};
