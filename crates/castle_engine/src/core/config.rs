//! # Unified Configuration System
//!
//! All configuration structures live here so a whole session can be described
//! by one file. Every section has sensible defaults and a `validate` pass.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging, fixed physics rate, presentation buffer
//! - **Physics Config**: gravity, timestep, friction, collision response
//! - **Actor Config**: character tuning consumed by the action states
//! - **Key Bindings**: key to command mapping for the input manager

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::input::KeyBindings;
use crate::physics::Projection;
use crate::spatial::QuadtreeConfig;

/// # Engine Configuration
///
/// Core loop behavior: logging and the fixed physics rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,
    /// Physics steps per second
    pub physics_rate_hz: u32,
    /// Upper bound on physics steps run inside one outer frame
    pub max_steps_per_frame: u32,
    /// Target presentation frame rate (0 = unlimited)
    pub target_fps: u32,
    /// Size of the presentation buffer in pixels
    pub buffer_size: (u32, u32),
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            physics_rate_hz: 60,
            max_steps_per_frame: 5,
            target_fps: 60,
            buffer_size: (350, 350),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set physics rate
    pub fn with_physics_rate(mut self, hz: u32) -> Self {
        self.physics_rate_hz = hz;
        self
    }

    /// Length of one physics step in seconds
    pub fn physics_step(&self) -> f32 {
        1.0 / self.physics_rate_hz as f32
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics_rate_hz == 0 {
            return Err(ConfigError::Invalid("physics rate must be at least 1 Hz".to_string()));
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid("max steps per frame must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Physics Configuration
///
/// Constants for one [`Simulation`](crate::physics::Simulation). Velocities
/// are in simulation units per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward (positive z) gravity
    pub gravity: f32,
    /// Step length in seconds
    pub timestep: f32,
    /// World to simulation unit scale, applied once to every body on entry
    pub scaling: f32,
    /// Per-second ground friction factor; the per-step factor is `base^timestep`
    pub ground_friction_base: f32,
    /// Lateral speed above which a blocked axis counts as a hard stop
    pub axis_stop_threshold: f32,
    /// Landing speed above which a body bounces
    pub bounce_threshold: f32,
    /// Fraction of landing speed kept by a bounce
    pub bounce_damping: f32,
    /// Lowest z a body may reach when blocked by static geometry
    pub floor_clamp_depth: f32,
    /// Decimal places used when checking lateral velocity for sleep
    pub lateral_sleep_precision: u32,
    /// Decimal places used when checking vertical velocity for sleep
    pub vertical_sleep_precision: u32,
    /// 3D to 2D projection used for static geometry queries
    pub projection: Projection,
    /// Static geometry quadtree tuning
    pub spatial: QuadtreeConfig,
}

impl PhysicsConfig {
    /// Create a new physics configuration
    pub fn new() -> Self {
        Self {
            gravity: 900.0,
            timestep: 1.0 / 60.0,
            scaling: 1.0,
            ground_friction_base: 0.0001,
            axis_stop_threshold: 0.2,
            bounce_threshold: 0.2,
            bounce_damping: 0.05,
            floor_clamp_depth: -10.0,
            lateral_sleep_precision: 4,
            vertical_sleep_precision: 1,
            projection: Projection::Platformer,
            spatial: QuadtreeConfig::default(),
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set projection
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Set world scaling
    pub fn with_scaling(mut self, scaling: f32) -> Self {
        self.scaling = scaling;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timestep > 0.0) {
            return Err(ConfigError::Invalid(format!("timestep must be positive, got {}", self.timestep)));
        }
        if !(self.scaling > 0.0) {
            return Err(ConfigError::Invalid(format!("scaling must be positive, got {}", self.scaling)));
        }
        if !(0.0..=1.0).contains(&self.ground_friction_base) {
            return Err(ConfigError::Invalid(format!(
                "ground friction base must be within [0, 1], got {}",
                self.ground_friction_base
            )));
        }
        if !(0.0..=1.0).contains(&self.bounce_damping) {
            return Err(ConfigError::Invalid(format!(
                "bounce damping must be within [0, 1], got {}",
                self.bounce_damping
            )));
        }
        if self.floor_clamp_depth > 0.0 {
            return Err(ConfigError::Invalid("floor clamp depth must not be above the ground plane".to_string()));
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Actor Configuration
///
/// Character tuning read by the action states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Standing size (depth, width, height)
    pub size: [f32; 3],
    /// Body mass
    pub mass: f32,
    /// Ground speed
    pub max_speed: f32,
    /// Largest velocity change per second the ground motor may apply
    pub motor_max_force: f32,
    /// Upward impulse of one jump
    pub jump_strength: f32,
    /// Jump count cap for air jumps
    pub max_jumps: u32,
    /// Air speed as a multiple of ground speed
    pub air_speed_multiplier: f32,
    /// Lateral force used to stick to walls
    pub wallgrab_force: f32,
    /// Lateral speed under which recovery from a hard landing ends
    pub initial_walk_speed: f32,
    /// Divisor applied to lateral speed on a hard landing
    pub fall_recover_divisor: f32,
    /// Lateral speed under which braking ends
    pub brake_stop_speed: f32,
}

impl ActorConfig {
    /// Create a new actor configuration
    pub fn new() -> Self {
        Self {
            size: [16.0, 16.0, 32.0],
            mass: 1.0,
            max_speed: 120.0,
            motor_max_force: 1200.0,
            jump_strength: 300.0,
            max_jumps: 2,
            air_speed_multiplier: 3.0,
            wallgrab_force: 200.0,
            initial_walk_speed: 40.0,
            fall_recover_divisor: 3.0,
            brake_stop_speed: 1.0,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size.iter().any(|&s| s < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "actor size components must be at least 1 unit, got {:?}",
                self.size
            )));
        }
        if !(self.mass > 0.0) {
            return Err(ConfigError::Invalid("actor mass must be positive".to_string()));
        }
        if !(self.fall_recover_divisor > 0.0) {
            return Err(ConfigError::Invalid("fall recover divisor must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Game Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Physics configuration
    pub physics: PhysicsConfig,
    /// Player character tuning
    pub actor: ActorConfig,
    /// Key bindings
    pub input: KeyBindings,
}

impl GameConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.physics.validate()?;
        self.actor.validate()?;
        self.input.validate()?;
        Ok(())
    }
}

impl Config for GameConfig {}
