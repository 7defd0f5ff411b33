//! Physics module for box bodies and collision response
//!
//! Provides axis-aligned bodies integrated under gravity, collision against
//! static level geometry through a quadtree broad phase, and brute-force
//! blocking between dynamic bodies.

pub mod body;
pub mod bounding_volume;
pub mod projection;
pub mod shared;
pub mod simulation;

pub use body::{Body, BodyHandle, SimulationId};
pub use bounding_volume::BoundingVolume;
pub use projection::Projection;
pub use shared::{Mutation, PendingOp, SharedSimulation, Ticket};
pub use simulation::Simulation;
