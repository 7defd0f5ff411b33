//! # Core Engine Module
//!
//! Shared abstractions the other subsystems depend on.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for engine, physics, actors and input
//! - **Foundation**: Low-level utilities (math, collections, time, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{ActorConfig, Config, ConfigError, EngineConfig, GameConfig, PhysicsConfig};
