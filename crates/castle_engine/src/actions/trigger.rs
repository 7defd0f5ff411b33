//! Commands and triggers
//!
//! A trigger is a command plus the button transition that produced it. Input
//! devices and AI both speak in triggers.

use serde::{Deserialize, Serialize};

/// Abstract player command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Move left
    Left,
    /// Move right
    Right,
    /// Jump
    Up,
    /// Crouch
    Down,
    /// Primary action (also jumps)
    Action1,
    /// Secondary action (wall grab)
    Action2,
}

impl Command {
    /// Every command in code order
    pub const ALL: [Command; 6] = [
        Command::Left,
        Command::Right,
        Command::Up,
        Command::Down,
        Command::Action1,
        Command::Action2,
    ];

    /// Command for a raw code, `None` if unknown
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Raw code of this command
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Left or right
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Commands that start a jump
    pub fn is_jump(self) -> bool {
        matches!(self, Self::Up | Self::Action1)
    }
}

/// Button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonState {
    /// Button went down
    Pressed,
    /// Button went up
    Released,
}

impl ButtonState {
    /// State for a raw code (0 released, 1 pressed), `None` if unknown
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Released),
            1 => Some(Self::Pressed),
            _ => None,
        }
    }
}

/// Command plus button transition, delivered to the active action state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trigger {
    /// What was asked for
    pub command: Command,
    /// How the button changed
    pub state: ButtonState,
}

impl Trigger {
    /// Create a trigger
    pub const fn new(command: Command, state: ButtonState) -> Self {
        Self { command, state }
    }

    /// Press of `command`
    pub const fn pressed(command: Command) -> Self {
        Self::new(command, ButtonState::Pressed)
    }

    /// Release of `command`
    pub const fn released(command: Command) -> Self {
        Self::new(command, ButtonState::Released)
    }

    /// Decode raw command and state codes; unknown codes yield `None`
    pub fn from_raw(command: u32, state: u32) -> Option<Self> {
        Some(Self::new(Command::from_code(command)?, ButtonState::from_code(state)?))
    }

    /// True for a press
    pub fn is_pressed(&self) -> bool {
        self.state == ButtonState::Pressed
    }

    /// True for a press of a horizontal command
    pub fn is_horizontal_press(&self) -> bool {
        self.is_pressed() && self.command.is_horizontal()
    }

    /// True for a press of a jump command
    pub fn is_jump_press(&self) -> bool {
        self.is_pressed() && self.command.is_jump()
    }
}
