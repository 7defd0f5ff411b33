//! Stack-based action state machine
//!
//! Each entity owns an [`ActionStack`]. Input arrives as [`Trigger`]s, the
//! active [`ActionState`] answers with a [`Transition`], and states read and
//! write physics facts through an [`ActionContext`].

pub mod stack;
pub mod state;
pub mod states;
pub mod trigger;

pub use stack::ActionStack;
pub use state::{ActionContext, ActionState, Phase, StateKind, StateSnapshot, Transition};
pub use trigger::{ButtonState, Command, Trigger};
