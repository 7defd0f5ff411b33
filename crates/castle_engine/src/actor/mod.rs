//! Controlled entities
//!
//! An [`Actor`] ties one body in a [`Simulation`] to an [`ActionStack`], a
//! ground [`Motor`] and an animator. Per frame the host calls, in order:
//!
//! 1. [`Actor::handle_trigger`] for every trigger produced this frame
//! 2. [`Actor::drive`] to apply the motor and wake the body when needed
//! 3. [`Simulation::step`]
//! 4. [`Actor::update`] so states can react to the new contact facts

use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::actions::states::{Die, Fall, Idle};
use crate::actions::{ActionContext, ActionStack, StateKind, Trigger};
use crate::animation::{Animator, Facing};
use crate::audio::AudioSink;
use crate::core::config::ActorConfig;
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameContext;
use crate::physics::{Body, BodyHandle, BoundingVolume, Simulation};

/// Identity of a game entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Drives lateral velocity toward a target rate while grounded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motor {
    /// Target lateral velocity
    pub rate: f32,
    /// Largest force the motor may apply
    pub max_force: f32,
}

impl Motor {
    /// Create an idle motor
    pub fn new(max_force: f32) -> Self {
        Self { rate: 0.0, max_force }
    }

    /// Push the body's lateral velocity toward `rate`.
    ///
    /// Only acts on grounded bodies. Returns true if the velocity changed.
    #[allow(clippy::float_cmp)]
    pub fn apply(&self, body: &mut Body, dt: f32) -> bool {
        if !body.grounded() {
            return false;
        }
        let max_delta = self.max_force / body.mass * dt;
        let delta = (self.rate - body.velocity.y).clamp(-max_delta, max_delta);
        if delta == 0.0 {
            return false;
        }
        body.velocity.y += delta;
        true
    }
}

/// Movement tuning used by the action states
#[derive(Debug, Clone, PartialEq)]
pub struct ActorProfile {
    /// Standing size (depth, width, height)
    pub size: Vec3,
    /// Body mass
    pub mass: f32,
    /// Ground speed
    pub max_speed: f32,
    /// Ground motor strength
    pub motor_max_force: f32,
    /// Jump impulse
    pub jump_strength: f32,
    /// Jump count cap for air jumps
    pub max_jumps: u32,
    /// Air speed multiple of ground speed
    pub air_speed_multiplier: f32,
    /// Wall grab force
    pub wallgrab_force: f32,
    /// Speed under which landing recovery ends
    pub initial_walk_speed: f32,
    /// Lateral speed divisor on a hard landing
    pub fall_recover_divisor: f32,
    /// Speed under which braking ends
    pub brake_stop_speed: f32,
}

impl ActorProfile {
    /// Height while crouched
    pub fn crouch_height(&self) -> f32 {
        self.size.z / 2.0
    }

    /// Height while standing
    pub fn standing_height(&self) -> f32 {
        self.size.z
    }

    /// Body for this profile with its back-left-bottom corner at `position`
    pub fn spawn_body(&self, position: Vec3) -> Body {
        Body::new(BoundingVolume::new(position, self.size)).with_mass(self.mass)
    }
}

impl From<&ActorConfig> for ActorProfile {
    fn from(config: &ActorConfig) -> Self {
        Self {
            size: Vec3::from(config.size),
            mass: config.mass,
            max_speed: config.max_speed,
            motor_max_force: config.motor_max_force,
            jump_strength: config.jump_strength,
            max_jumps: config.max_jumps,
            air_speed_multiplier: config.air_speed_multiplier,
            wallgrab_force: config.wallgrab_force,
            initial_walk_speed: config.initial_walk_speed,
            fall_recover_divisor: config.fall_recover_divisor,
            brake_stop_speed: config.brake_stop_speed,
        }
    }
}

impl Default for ActorProfile {
    fn default() -> Self {
        Self::from(&ActorConfig::default())
    }
}

/// World services an actor borrows for one call
pub struct Environment<'a> {
    /// Physics world
    pub simulation: &'a mut Simulation,
    /// Sound output
    pub audio: &'a mut dyn AudioSink,
    /// Frame facts
    pub frame: &'a FrameContext,
}

/// Entity driven by an action stack
pub struct Actor {
    id: EntityId,
    body: BodyHandle,
    motor: Motor,
    profile: ActorProfile,
    facing: Facing,
    animator: Box<dyn Animator>,
    stack: ActionStack,
}

impl Actor {
    /// Create an actor standing idle
    pub fn new(
        id: EntityId,
        body: BodyHandle,
        profile: ActorProfile,
        animator: Box<dyn Animator>,
        env: &mut Environment<'_>,
    ) -> Self {
        let mut actor = Self {
            id,
            body,
            motor: Motor::new(profile.motor_max_force),
            profile,
            facing: Facing::default(),
            animator,
            stack: ActionStack::new(),
        };
        actor.with_context(env, |stack, ctx| stack.push(Box::new(Idle), None, ctx));
        actor
    }

    fn with_context<R>(
        &mut self,
        env: &mut Environment<'_>,
        f: impl FnOnce(&mut ActionStack, &mut ActionContext<'_>) -> R,
    ) -> R {
        let mut ctx = ActionContext {
            entity: self.id,
            handle: self.body,
            simulation: &mut *env.simulation,
            motor: &mut self.motor,
            profile: &self.profile,
            facing: &mut self.facing,
            animator: self.animator.as_mut(),
            audio: &mut *env.audio,
            frame: env.frame,
        };
        f(&mut self.stack, &mut ctx)
    }

    /// Entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Body handle
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Ground motor
    pub fn motor(&self) -> &Motor {
        &self.motor
    }

    /// Movement tuning
    pub fn profile(&self) -> &ActorProfile {
        &self.profile
    }

    /// Current facing
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Action stack
    pub fn stack(&self) -> &ActionStack {
        &self.stack
    }

    /// Kind of the active state
    pub fn active_state(&self) -> Option<StateKind> {
        self.stack.active()
    }

    /// True once the actor has died
    pub fn is_dead(&self) -> bool {
        self.stack.active() == Some(StateKind::Die)
    }

    /// Deliver a trigger to the active state
    pub fn handle_trigger(&mut self, trigger: Trigger, env: &mut Environment<'_>) {
        self.with_context(env, |stack, ctx| stack.handle_trigger(trigger, ctx));
    }

    /// Apply the motor, waking the body if it changed or has forces acting
    pub fn drive(&mut self, simulation: &mut Simulation, dt: f32) {
        let body = &mut simulation[self.body];
        let changed = self.motor.apply(body, dt);
        let forced = body.force() != Vec3::zeros();
        if changed || forced {
            simulation.wake(self.body);
        }
    }

    /// Tick the active state, then start falling if airborne and descending
    pub fn update(&mut self, dt: f32, env: &mut Environment<'_>) {
        self.animator.update(dt);
        self.with_context(env, |stack, ctx| {
            stack.update(dt, ctx);

            let body = ctx.body();
            let falling = !body.grounded() && body.is_descending();
            if falling && matches!(stack.active(), Some(StateKind::Idle | StateKind::Move)) {
                stack.push(Box::new(Fall::default()), None, ctx);
            }
        });
    }

    /// Push the death state
    pub fn kill(&mut self, env: &mut Environment<'_>) {
        if self.is_dead() {
            return;
        }
        info!("{:?} died", self.id);
        self.with_context(env, |stack, ctx| stack.push(Box::new(Die), None, ctx));
    }

    /// Exit every state and take the body out of the simulation
    pub fn despawn(mut self, env: &mut Environment<'_>) -> Body {
        self.with_context(env, |stack, ctx| stack.clear(ctx));
        env.simulation.remove(self.body)
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("body", &self.body)
            .field("motor", &self.motor)
            .field("facing", &self.facing)
            .field("stack", &self.stack.kinds())
            .finish_non_exhaustive()
    }
}
