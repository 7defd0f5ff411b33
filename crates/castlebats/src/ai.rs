//! Bat behavior
//!
//! Bats are actors like the hero; instead of a keyboard they get triggers from
//! a [`BatBrain`] that picks a new whim every so often.

use castle_engine::actions::{Command, Trigger};
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seconds between decisions
const THINK_INTERVAL: std::ops::Range<f32> = 0.3..1.2;

/// Random trigger source for one bat
#[derive(Debug, Clone)]
pub struct BatBrain {
    rng: StdRng,
    cooldown: f32,
    held: Option<Command>,
}

impl BatBrain {
    /// Brain with a reproducible sequence of decisions
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let cooldown = rng.gen_range(THINK_INTERVAL);
        Self {
            rng,
            cooldown,
            held: None,
        }
    }

    /// Direction currently held, if any
    pub fn held(&self) -> Option<Command> {
        self.held
    }

    /// Advance by `dt` and return the triggers decided this frame
    pub fn think(&mut self, dt: f32) -> Vec<Trigger> {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return Vec::new();
        }
        self.cooldown = self.rng.gen_range(THINK_INTERVAL);

        let mut triggers = Vec::new();
        if let Some(command) = self.held.take() {
            triggers.push(Trigger::released(command));
        }

        match self.rng.gen_range(0..4) {
            0 => {}
            1 => self.hold(Command::Left, &mut triggers),
            2 => self.hold(Command::Right, &mut triggers),
            _ => {
                triggers.push(Trigger::pressed(Command::Up));
                triggers.push(Trigger::released(Command::Up));
            }
        }
        trace!("bat decided {:?}", triggers);
        triggers
    }

    fn hold(&mut self, command: Command, triggers: &mut Vec<Trigger>) {
        self.held = Some(command);
        triggers.push(Trigger::pressed(command));
    }
}
