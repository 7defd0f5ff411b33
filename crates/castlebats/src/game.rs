//! Headless game session
//!
//! Owns the simulation and every actor, and runs the frame loop: scripted
//! keys and bat decisions become triggers, then fixed physics steps run with
//! each actor's motor applied before and its states updated after.

use std::collections::VecDeque;
use std::time::Instant;

use castle_engine::actions::{StateKind, Trigger};
use castle_engine::actor::{Actor, ActorProfile, EntityId, Environment};
use castle_engine::animation::HeadlessAnimator;
use castle_engine::audio::{SoundBank, SoundManager};
use castle_engine::core::config::GameConfig;
use castle_engine::foundation::math::Vec3;
use castle_engine::foundation::time::{FixedTimestep, FrameContext, SessionClock};
use castle_engine::input::{InputManager, KeyCode};
use castle_engine::physics::Simulation;
use log::{debug, info};

use crate::ai::BatBrain;
use crate::error::GameError;
use crate::level::Level;

const HERO_ID: EntityId = EntityId(0);

/// One key event at a point in session time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedKey {
    /// Session time in seconds
    pub at: f32,
    /// Key
    pub key: KeyCode,
    /// Press or release
    pub pressed: bool,
}

impl ScriptedKey {
    fn press(at: f32, key: KeyCode) -> Self {
        Self { at, key, pressed: true }
    }

    fn release(at: f32, key: KeyCode) -> Self {
        Self { at, key, pressed: false }
    }
}

/// Walk, brake, jump, crouch, run the other way with a jump, then quit
pub fn demo_script() -> Vec<ScriptedKey> {
    vec![
        ScriptedKey::press(0.1, KeyCode::Left),
        ScriptedKey::release(1.0, KeyCode::Left),
        ScriptedKey::press(1.6, KeyCode::Up),
        ScriptedKey::release(1.7, KeyCode::Up),
        ScriptedKey::press(3.2, KeyCode::Down),
        ScriptedKey::release(3.6, KeyCode::Down),
        ScriptedKey::press(4.0, KeyCode::Right),
        ScriptedKey::press(4.3, KeyCode::Space),
        ScriptedKey::release(4.4, KeyCode::Space),
        ScriptedKey::release(5.0, KeyCode::Right),
        ScriptedKey::press(6.0, KeyCode::Escape),
    ]
}

struct Bat {
    actor: Actor,
    brain: BatBrain,
}

/// What a session did
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Outer frames run
    pub frames: u64,
    /// Physics steps run
    pub steps: u64,
    /// Hero's final position
    pub hero_position: Vec3,
    /// Hero's final state
    pub hero_state: Option<StateKind>,
    /// Bodies asleep at the end
    pub sleeping: usize,
    /// Sounds emitted
    pub sounds: u64,
}

/// Running session
pub struct Game {
    simulation: Simulation,
    audio: SoundManager,
    input: InputManager,
    hero: Actor,
    bats: Vec<Bat>,
    fixed: FixedTimestep,
    frame: FrameContext,
    frame_delta: f32,
    clock: SessionClock,
    script: VecDeque<ScriptedKey>,
    steps: u64,
    running: bool,
}

impl Game {
    /// Build the level and spawn the hero and bats
    pub fn new(config: GameConfig, level: Level) -> Result<Self, GameError> {
        config.validate()?;
        let hero_profile = ActorProfile::from(&config.actor);
        level.validate(hero_profile.size)?;

        let mut simulation = Simulation::from_rects(config.physics.clone(), vec![], &level.geometry);
        let mut audio = SoundManager::new();
        audio.load_bank(SoundBank::new("castle", ["stop.wav"]));
        let frame = FrameContext::new(config.engine.buffer_size);

        let bat_profile = ActorProfile {
            max_speed: hero_profile.max_speed / 2.0,
            jump_strength: hero_profile.jump_strength * 0.75,
            ..hero_profile.clone()
        };

        let hero_body = simulation.add(hero_profile.spawn_body(level.hero_spawn));
        let bat_bodies: Vec<_> = level
            .bat_spawns
            .iter()
            .map(|&spawn| simulation.add(bat_profile.spawn_body(spawn)))
            .collect();

        let mut env = Environment {
            simulation: &mut simulation,
            audio: &mut audio,
            frame: &frame,
        };
        let hero = Actor::new(HERO_ID, hero_body, hero_profile, Box::new(HeadlessAnimator::default()), &mut env);
        let bats = bat_bodies
            .into_iter()
            .zip(1u32..)
            .map(|(body, id)| Bat {
                actor: Actor::new(EntityId(id), body, bat_profile.clone(), Box::new(HeadlessAnimator::default()), &mut env),
                brain: BatBrain::new(u64::from(id)),
            })
            .collect::<Vec<_>>();

        info!("Level '{}' ready: {} solids, {} bats", level.name, level.geometry.len(), bats.len());

        let engine = &config.engine;
        let frame_delta = if engine.target_fps > 0 {
            1.0 / engine.target_fps as f32
        } else {
            engine.physics_step()
        };

        Ok(Self {
            simulation,
            audio,
            input: InputManager::new(config.input.clone()),
            hero,
            bats,
            fixed: FixedTimestep::new(engine.physics_step(), engine.max_steps_per_frame),
            frame,
            frame_delta,
            clock: SessionClock::new(),
            script: VecDeque::new(),
            steps: 0,
            running: true,
        })
    }

    /// Feed these keys at their times
    pub fn with_script(mut self, mut script: Vec<ScriptedKey>) -> Self {
        script.sort_by(|a, b| a.at.total_cmp(&b.at));
        self.script = script.into();
        self
    }

    /// Hero actor
    pub fn hero(&self) -> &Actor {
        &self.hero
    }

    /// Physics world
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// False once Escape was pressed
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run frames until `seconds` of session time pass or the session quits
    pub fn run(&mut self, seconds: f32) -> SessionSummary {
        let started = Instant::now();
        while self.running && self.clock.elapsed() < seconds {
            self.frame(self.frame_delta);
        }
        info!(
            "Session ended after {} frames ({:.1} ms wall clock)",
            self.clock.frames(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        self.summary()
    }

    /// Run one outer frame of `delta` seconds
    pub fn frame(&mut self, delta: f32) {
        self.clock.tick(delta);

        for trigger in self.scripted_triggers() {
            let mut env = Environment {
                simulation: &mut self.simulation,
                audio: &mut self.audio,
                frame: &self.frame,
            };
            self.hero.handle_trigger(trigger, &mut env);
        }

        for bat in &mut self.bats {
            let mut env = Environment {
                simulation: &mut self.simulation,
                audio: &mut self.audio,
                frame: &self.frame,
            };
            for trigger in bat.brain.think(delta) {
                bat.actor.handle_trigger(trigger, &mut env);
            }
        }

        let steps = self.fixed.advance(delta);
        let dt = self.fixed.step();
        for _ in 0..steps {
            self.step(dt);
        }
        self.steps += u64::from(steps);
        self.frame = self.frame.next(delta);
    }

    fn step(&mut self, dt: f32) {
        self.hero.drive(&mut self.simulation, dt);
        for bat in &mut self.bats {
            bat.actor.drive(&mut self.simulation, dt);
        }

        self.simulation.step(dt);

        let mut env = Environment {
            simulation: &mut self.simulation,
            audio: &mut self.audio,
            frame: &self.frame,
        };
        self.hero.update(dt, &mut env);
        for bat in &mut self.bats {
            bat.actor.update(dt, &mut env);
        }
    }

    fn scripted_triggers(&mut self) -> Vec<Trigger> {
        let now = self.clock.elapsed();
        let mut triggers = Vec::new();
        while let Some(key) = self.script.front().copied() {
            if key.at > now {
                break;
            }
            self.script.pop_front();

            if key.key == KeyCode::Escape && key.pressed {
                info!("Escape pressed at {:.2}s", now);
                self.running = false;
                continue;
            }
            if let Some(trigger) = self.input.handle_key_input(key.key, key.pressed) {
                debug!("hero input {:?}", trigger);
                triggers.push(trigger);
            }
        }
        triggers
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            frames: self.clock.frames(),
            steps: self.steps,
            hero_position: self.simulation[self.hero.body()].volume.position,
            hero_state: self.hero.active_state(),
            sleeping: self.simulation.sleeping_count(),
            sounds: self.audio.emitted_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(GameConfig::default(), Level::castle()).unwrap()
    }

    #[test]
    fn test_idle_session_settles() {
        let mut game = game();
        let summary = game.run(0.5);
        assert!((30..=31).contains(&summary.frames));
        assert_eq!(summary.hero_state, Some(StateKind::Idle));
        assert_eq!(summary.hero_position, Vec3::zeros());
        assert_eq!(game.simulation().len(), 4);
    }

    #[test]
    fn test_demo_script_runs_to_escape() {
        let mut game = game().with_script(demo_script());
        let summary = game.run(30.0);

        assert!(!game.is_running());
        assert!(summary.frames < 30 * 60);
        assert!(summary.sounds >= 1);
        assert!(!game.hero().is_dead());
        assert!(summary.hero_position.z <= 0.0);
        assert!(summary.hero_position.y.abs() < 400.0);
    }

    #[test]
    fn test_scripted_keys_walk_and_jump_the_hero() {
        const DT: f32 = 1.0 / 60.0;
        let mut game = game().with_script(demo_script());
        let hero_body = |game: &Game| game.simulation()[game.hero().body()].clone();

        for _ in 0..60 {
            game.frame(DT);
        }
        let walked = hero_body(&game);
        assert!(walked.volume.left() > 30.0, "hero stayed at {:?}", walked.volume.position);
        assert_eq!(walked.volume.bottom(), 0.0);

        let mut airborne = 0;
        let mut highest = 0.0_f32;
        for _ in 0..120 {
            game.frame(DT);
            let body = hero_body(&game);
            if body.volume.bottom() < 0.0 {
                airborne += 1;
                highest = highest.min(body.volume.bottom());
            }
        }
        assert!(airborne > 30);
        assert!(highest < -20.0);
        assert!(!game.hero().is_dead());
    }

    #[test]
    fn test_sessions_are_deterministic() {
        let a = game().with_script(demo_script()).run(3.0);
        let b = game().with_script(demo_script()).run(3.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.physics.timestep = 0.0;
        assert!(matches!(Game::new(config, Level::castle()), Err(GameError::Config(_))));
    }
}
