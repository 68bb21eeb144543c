//! Keyboard mapping
//!
//! Turns named key presses and releases into paddle intents and match
//! commands. Player one uses W/S, player two the arrow keys.

use std::collections::HashMap;

use crate::sim::{Command, Intent, Player};

/// A decoded input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Steer(Player, Intent),
    Command(Command),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Paddle(Player, Intent),
    Command(Command),
}

/// Key name -> binding table
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<String, Binding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self {
            bindings: HashMap::new(),
        };
        map.bind_paddle("w", Player::One, Intent::Up);
        map.bind_paddle("s", Player::One, Intent::Down);
        map.bind_paddle("up", Player::Two, Intent::Up);
        map.bind_paddle("down", Player::Two, Intent::Down);
        map.bind_command("space", Command::TogglePause);
        map.bind_command("return", Command::Confirm);
        map.bind_command("enter", Command::Confirm);
        map.bind_command("escape", Command::Cancel);
        map.bind_command("esc", Command::Cancel);
        map.bind_command("m", Command::ToggleSound);
        map
    }
}

impl KeyMap {
    pub fn bind_paddle(&mut self, key: &str, player: Player, intent: Intent) {
        self.bindings
            .insert(key.to_lowercase(), Binding::Paddle(player, intent));
    }

    pub fn bind_command(&mut self, key: &str, command: Command) {
        self.bindings
            .insert(key.to_lowercase(), Binding::Command(command));
    }

    /// Key names are case-insensitive
    pub fn press(&self, key: &str) -> Option<InputEvent> {
        match self.bindings.get(&key.to_lowercase())? {
            Binding::Paddle(player, intent) => Some(InputEvent::Steer(*player, *intent)),
            Binding::Command(command) => Some(InputEvent::Command(*command)),
        }
    }

    /// Releasing a paddle key stops that paddle; command keys act on press only
    pub fn release(&self, key: &str) -> Option<InputEvent> {
        match self.bindings.get(&key.to_lowercase())? {
            Binding::Paddle(player, _) => Some(InputEvent::Steer(*player, Intent::Stop)),
            Binding::Command(_) => None,
        }
    }
}
