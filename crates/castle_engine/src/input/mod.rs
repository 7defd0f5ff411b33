//! Input management system
//!
//! Maps device keys to [`Command`]s through configurable bindings and turns
//! key transitions into [`Trigger`]s for the action stacks.

use bitflags::bitflags;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::actions::{ButtonState, Command, Trigger};
use crate::config::ConfigError;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// S key
    S,
    /// W key
    W,
    /// X key
    X,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

bitflags! {
    /// Set of held commands
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandSet: u8 {
        /// Left held
        const LEFT = 1 << 0;
        /// Right held
        const RIGHT = 1 << 1;
        /// Up held
        const UP = 1 << 2;
        /// Down held
        const DOWN = 1 << 3;
        /// Primary action held
        const ACTION1 = 1 << 4;
        /// Secondary action held
        const ACTION2 = 1 << 5;
    }
}

impl From<Command> for CommandSet {
    fn from(command: Command) -> Self {
        match command {
            Command::Left => Self::LEFT,
            Command::Right => Self::RIGHT,
            Command::Up => Self::UP,
            Command::Down => Self::DOWN,
            Command::Action1 => Self::ACTION1,
            Command::Action2 => Self::ACTION2,
        }
    }
}

/// One key to command mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Device key
    pub key: KeyCode,
    /// Command it produces
    pub command: Command,
}

/// Key bindings for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Bindings, first match wins
    pub bindings: Vec<KeyBinding>,
}

impl KeyBindings {
    /// Command bound to `key`
    pub fn command_for(&self, key: KeyCode) -> Option<Command> {
        self.bindings
            .iter()
            .find(|binding| binding.key == key)
            .map(|binding| binding.command)
    }

    /// Add or replace the binding for `key`
    pub fn bind(&mut self, key: KeyCode, command: Command) {
        match self.bindings.iter_mut().find(|binding| binding.key == key) {
            Some(binding) => binding.command = command,
            None => self.bindings.push(KeyBinding { key, command }),
        }
    }

    /// Validate the bindings
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, binding) in self.bindings.iter().enumerate() {
            if self.bindings[..index].iter().any(|earlier| earlier.key == binding.key) {
                return Err(ConfigError::Invalid(format!("key {:?} is bound twice", binding.key)));
            }
        }
        Ok(())
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = [
            (KeyCode::Left, Command::Left),
            (KeyCode::Right, Command::Right),
            (KeyCode::Up, Command::Up),
            (KeyCode::Down, Command::Down),
            (KeyCode::Z, Command::Action1),
            (KeyCode::Space, Command::Action1),
            (KeyCode::X, Command::Action2),
        ];
        Self {
            bindings: bindings.into_iter().map(|(key, command)| KeyBinding { key, command }).collect(),
        }
    }
}

/// Input manager
#[derive(Debug, Clone, Default)]
pub struct InputManager {
    bindings: KeyBindings,
    held: CommandSet,
    queue: Vec<Trigger>,
}

impl InputManager {
    /// Create a new input manager
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: CommandSet::empty(),
            queue: Vec::new(),
        }
    }

    /// Handle key input; unbound keys and key repeat are ignored
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) -> Option<Trigger> {
        let command = self.bindings.command_for(key)?;
        let state = if pressed { ButtonState::Pressed } else { ButtonState::Released };
        self.handle_trigger(Trigger::new(command, state))
    }

    /// Handle raw command and state codes from a device layer
    pub fn handle_raw(&mut self, command: u32, state: u32) -> Option<Trigger> {
        match Trigger::from_raw(command, state) {
            Some(trigger) => self.handle_trigger(trigger),
            None => {
                warn!("ignoring unknown input code {command}/{state}");
                None
            }
        }
    }

    /// Queue a trigger, updating the held set
    pub fn handle_trigger(&mut self, trigger: Trigger) -> Option<Trigger> {
        let flag = CommandSet::from(trigger.command);
        let was_held = self.held.contains(flag);
        match trigger.state {
            ButtonState::Pressed if was_held => return None,
            ButtonState::Released if !was_held => return None,
            ButtonState::Pressed => self.held.insert(flag),
            ButtonState::Released => self.held.remove(flag),
        }
        self.queue.push(trigger);
        Some(trigger)
    }

    /// True while `command` is held
    pub fn is_held(&self, command: Command) -> bool {
        self.held.contains(CommandSet::from(command))
    }

    /// Commands currently held
    pub fn held(&self) -> CommandSet {
        self.held
    }

    /// Take the triggers queued since the last drain
    pub fn drain(&mut self) -> Vec<Trigger> {
        std::mem::take(&mut self.queue)
    }

    /// Active bindings
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }
}
