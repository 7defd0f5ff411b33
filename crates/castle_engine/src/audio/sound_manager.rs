//! Sound bookkeeping
//!
//! Tracks which sounds are loaded (individually or through named banks) and
//! which emissions are currently active. Actual mixing is the host's job.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::AudioSink;
use crate::actor::EntityId;

/// Unique identifier for a sound
pub type SoundId = String;

/// Sound bank containing multiple related sounds
#[derive(Debug, Clone)]
pub struct SoundBank {
    name: String,
    sounds: Vec<SoundId>,
}

impl SoundBank {
    /// Create a bank
    pub fn new(name: impl Into<String>, sounds: impl IntoIterator<Item = impl Into<SoundId>>) -> Self {
        Self {
            name: name.into(),
            sounds: sounds.into_iter().map(Into::into).collect(),
        }
    }

    /// Bank name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sounds in the bank
    pub fn sounds(&self) -> &[SoundId] {
        &self.sounds
    }
}

/// One playing sound and the entity that emitted it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// Sound played
    pub sound: SoundId,
    /// Emitting entity
    pub source: EntityId,
}

/// Sound manager
#[derive(Debug, Default)]
pub struct SoundManager {
    banks: HashMap<String, SoundBank>,
    loaded_sounds: HashSet<SoundId>,
    active: Vec<Emission>,
    emitted_total: u64,
}

impl SoundManager {
    /// Create a new sound manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a single sound as loaded
    pub fn load(&mut self, sound: impl Into<SoundId>) {
        self.loaded_sounds.insert(sound.into());
    }

    /// Load every sound of a bank
    pub fn load_bank(&mut self, bank: SoundBank) {
        debug!("loading sound bank {} ({} sounds)", bank.name, bank.sounds.len());
        self.loaded_sounds.extend(bank.sounds.iter().cloned());
        self.banks.insert(bank.name.clone(), bank);
    }

    /// Unload a bank's sounds, returning false if the bank is unknown
    pub fn unload_bank(&mut self, name: &str) -> bool {
        let Some(bank) = self.banks.remove(name) else {
            return false;
        };
        for sound in &bank.sounds {
            self.loaded_sounds.remove(sound);
        }
        true
    }

    /// Check if a sound is loaded
    pub fn is_loaded(&self, sound_id: &str) -> bool {
        self.loaded_sounds.contains(sound_id)
    }

    /// Check if a sound is currently playing
    pub fn is_playing(&self, sound_id: &str) -> bool {
        self.active.iter().any(|e| e.sound == sound_id)
    }

    /// Active emissions, oldest first
    pub fn active(&self) -> &[Emission] {
        &self.active
    }

    /// Number of emissions since creation
    pub fn emitted_total(&self) -> u64 {
        self.emitted_total
    }

    /// Forget every active emission
    pub fn stop_all(&mut self) {
        self.active.clear();
    }
}

impl AudioSink for SoundManager {
    fn emit(&mut self, sound: &str, source: EntityId) {
        if !self.is_loaded(sound) {
            warn!("emitting unloaded sound {sound}");
        }
        debug!("{source:?} emits {sound}");
        self.active.push(Emission {
            sound: sound.to_string(),
            source,
        });
        self.emitted_total += 1;
    }

    fn stop(&mut self, sound: &str) {
        self.active.retain(|e| e.sound != sound);
    }
}
