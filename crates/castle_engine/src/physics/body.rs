//! Physics bodies
//!
//! A body is one bounding volume plus the motion state the simulation
//! integrates. Bodies are owned by exactly one [`Simulation`](super::Simulation)
//! once added and are addressed through a [`BodyHandle`].

use serde::{Deserialize, Serialize};

use super::bounding_volume::BoundingVolume;
use crate::foundation::collections::new_key_type;
use crate::foundation::math::Vec3;

new_key_type! {
    /// Generational handle to a body stored in a simulation
    pub struct BodyHandle;
}

/// Identity of a simulation, used as a body's owner back-reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulationId(pub u32);

/// Dynamic or static physical object
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Collision volume
    pub volume: BoundingVolume,
    /// Velocity in units per second
    pub velocity: Vec3,
    /// Accumulated acceleration
    pub acceleration: Vec3,
    /// Whether gravity is applied; bodies without it are parked asleep
    pub gravity: bool,
    /// Mass used to convert forces and impulses
    pub mass: f32,
    force: Vec3,
    grounded: bool,
    landed: bool,
    owner: Option<SimulationId>,
}

impl Body {
    /// Create a gravity-affected body at rest
    pub fn new(volume: BoundingVolume) -> Self {
        Self {
            volume,
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            gravity: true,
            mass: 1.0,
            force: Vec3::zeros(),
            grounded: false,
            landed: false,
            owner: None,
        }
    }

    /// Create a body that ignores gravity (static geometry and flyers)
    pub fn fixed(volume: BoundingVolume) -> Self {
        Self {
            gravity: false,
            ..Self::new(volume)
        }
    }

    /// Set initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set initial acceleration
    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Add `impulse / mass` to the velocity
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse / self.mass;
    }

    /// Accumulate a force applied on every step until cleared
    pub fn apply_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Clear accumulated forces
    pub fn reset_forces(&mut self) {
        self.force = Vec3::zeros();
    }

    /// Accumulated force
    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// True if the last step blocked a descending move
    pub fn grounded(&self) -> bool {
        self.grounded
    }

    /// True on the first step the body became grounded
    pub fn landed(&self) -> bool {
        self.landed
    }

    /// Vertical velocity points down
    pub fn is_descending(&self) -> bool {
        self.velocity.z > 0.0
    }

    /// Lateral speed
    pub fn lateral_speed(&self) -> f32 {
        self.velocity.y.abs()
    }

    /// Owning simulation, if any
    pub fn owner(&self) -> Option<SimulationId> {
        self.owner
    }

    /// Change the height keeping the maximum-z face fixed
    pub fn resize_height(&mut self, height: f32) {
        let old = self.volume.size.z;
        self.volume.size.z = height;
        self.volume.position.z += old - height;
    }

    pub(super) fn set_owner(&mut self, owner: Option<SimulationId>) {
        self.owner = owner;
    }

    pub(crate) fn record_contact(&mut self, grounded: bool) {
        self.landed = grounded && !self.grounded;
        self.grounded = grounded;
    }
}
