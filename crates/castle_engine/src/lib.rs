//! # Castle Engine
//!
//! Box physics and stack-based action states for 2D action games.
//!
//! ## Features
//!
//! - **Simulation**: Gravity, sleeping, ground friction and per-axis collision
//!   against static level geometry and other bodies
//! - **Broad Phase**: Quadtree over the level's 2D projection
//! - **Action States**: Per-entity stack of behaviors driven by input triggers
//! - **Configuration**: TOML and RON config files with validation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use castle_engine::prelude::*;
//!
//! let config = GameConfig::default();
//! let floor = Rect::new(-500, 32, 1000, 16);
//! let mut simulation = Simulation::from_rects(config.physics.clone(), vec![], &[floor]);
//!
//! let profile = ActorProfile::from(&config.actor);
//! let handle = simulation.add(profile.spawn_body(Vec3::zeros()));
//! let mut audio = SoundManager::new();
//! let frame = FrameContext::default();
//!
//! let mut env = Environment { simulation: &mut simulation, audio: &mut audio, frame: &frame };
//! let mut hero = Actor::new(EntityId(1), handle, profile, Box::new(HeadlessAnimator::default()), &mut env);
//!
//! hero.handle_trigger(Trigger::pressed(Command::Left), &mut env);
//! let dt = config.physics.timestep;
//! hero.drive(env.simulation, dt);
//! env.simulation.step(dt);
//! hero.update(dt, &mut env);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Shared abstractions
pub mod config;
pub mod core;
pub mod foundation;

// Physics
pub mod physics;
pub mod spatial;

// Behavior and its services
pub mod actions;
pub mod actor;
pub mod animation;
pub mod audio;
pub mod input;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        actions::{ActionStack, ActionState, ButtonState, Command, StateKind, Transition, Trigger},
        actor::{Actor, ActorProfile, EntityId, Environment, Motor},
        animation::{Animator, Facing, HeadlessAnimator, PlayOptions},
        audio::{AudioSink, SoundBank, SoundManager},
        core::config::{ActorConfig, Config, ConfigError, EngineConfig, GameConfig, PhysicsConfig},
        foundation::{
            math::Vec3,
            time::{FixedTimestep, FrameContext, SessionClock},
        },
        input::{InputManager, KeyBindings, KeyCode},
        physics::{Body, BodyHandle, BoundingVolume, Projection, SharedSimulation, Simulation},
        spatial::{Quadtree, Rect, SpatialIndex},
    };
}
