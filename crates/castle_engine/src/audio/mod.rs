//! Audio interface
//!
//! Gameplay emits sounds by id through [`AudioSink`]; [`SoundManager`] is the
//! bookkeeping implementation used by the game.

mod sound_manager;

pub use sound_manager::{Emission, SoundBank, SoundId, SoundManager};

use crate::actor::EntityId;

/// Destination for sound effects
pub trait AudioSink: Send {
    /// Start `sound` on behalf of `source`
    fn emit(&mut self, sound: &str, source: EntityId);

    /// Stop every instance of `sound`
    fn stop(&mut self, sound: &str);
}
