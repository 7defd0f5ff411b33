//! Action state lifecycle
//!
//! States run `init` once before first activation, `enter` on every push,
//! `update` every tick while on top and `exit` once when discarded. They reach
//! the entity through an [`ActionContext`] and request stack changes by
//! returning a [`Transition`].

use std::fmt;

use super::trigger::Trigger;
use crate::actor::{ActorProfile, EntityId, Motor};
use crate::animation::{Animator, Facing, PlayOptions};
use crate::audio::AudioSink;
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameContext;
use crate::physics::{Body, BodyHandle, Simulation};

/// Identifies a concrete state type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Standing still
    Idle,
    /// Walking or running on the ground
    Move,
    /// Crouched
    Crouch,
    /// Standing back up
    Uncrouch,
    /// Rising after a jump
    Jump,
    /// Falling
    Fall,
    /// Absorbing a hard landing
    FallRecover,
    /// Dead
    Die,
    /// Steering in the air
    AirMove,
    /// Sliding to a stop
    Brake,
    /// Recovering from a stop
    Unbrake,
    /// Holding onto a wall
    WallGrab,
}

/// Lifecycle phase of a state on a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, `init` not yet run
    Uninitialized,
    /// On top of the stack
    Active,
    /// Covered by another state
    Suspended,
    /// Discarded, `exit` has run
    Exited,
}

/// Read-only view of a state, handed to the next state's `init`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Kind of the state
    pub kind: StateKind,
    /// Trigger the state was pushed with
    pub trigger: Option<Trigger>,
}

/// Requested change to the stack
pub enum Transition {
    /// Stay
    None,
    /// Discard the active state and resume the one below
    Pop,
    /// Suspend the active state and push a new one
    Push(Box<dyn ActionState>, Option<Trigger>),
    /// Discard the active state, then push a new one
    Replace(Box<dyn ActionState>, Option<Trigger>),
}

impl Transition {
    /// True for [`Transition::None`]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Pop => write!(f, "Pop"),
            Self::Push(state, trigger) => write!(f, "Push({:?}, {:?})", state.kind(), trigger),
            Self::Replace(state, trigger) => write!(f, "Replace({:?}, {:?})", state.kind(), trigger),
        }
    }
}

/// Everything a state may touch while it runs
pub struct ActionContext<'a> {
    /// Entity the stack belongs to
    pub entity: EntityId,
    /// The entity's body
    pub handle: BodyHandle,
    /// Physics world holding the body
    pub simulation: &'a mut Simulation,
    /// Ground motor
    pub motor: &'a mut Motor,
    /// Movement tuning
    pub profile: &'a ActorProfile,
    /// Current facing
    pub facing: &'a mut Facing,
    /// Presentation
    pub animator: &'a mut dyn Animator,
    /// Sound output
    pub audio: &'a mut dyn AudioSink,
    /// Frame facts
    pub frame: &'a FrameContext,
}

impl ActionContext<'_> {
    /// The entity's body
    pub fn body(&self) -> &Body {
        &self.simulation[self.handle]
    }

    /// The entity's body, woken so the change is integrated
    pub fn body_mut(&mut self) -> &mut Body {
        self.simulation.wake(self.handle);
        &mut self.simulation[self.handle]
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.body().velocity
    }

    /// True if the body stood on something last step
    pub fn grounded(&self) -> bool {
        self.body().grounded()
    }

    /// True on the step the body touched down
    pub fn landed(&self) -> bool {
        self.body().landed()
    }

    /// Play a clip
    pub fn play(&mut self, clip: &str, options: PlayOptions) {
        self.animator.play(clip, options);
    }

    /// Turn toward `facing`
    pub fn face(&mut self, facing: Facing) {
        *self.facing = facing;
        self.animator.set_flip(facing);
    }

    /// Emit a sound from this entity
    pub fn emit_sound(&mut self, sound: &str) {
        self.audio.emit(sound, self.entity);
    }
}

/// Behavior unit on an [`ActionStack`](super::ActionStack)
pub trait ActionState: fmt::Debug + Send {
    /// Which state this is
    fn kind(&self) -> StateKind;

    /// Run once before first activation with a view of the state below
    fn init(&mut self, _previous: Option<&StateSnapshot>, _ctx: &mut ActionContext<'_>) {}

    /// Run on every push
    fn enter(&mut self, trigger: Option<Trigger>, ctx: &mut ActionContext<'_>);

    /// Run every tick while active
    fn update(&mut self, _dt: f32, _ctx: &mut ActionContext<'_>) -> Transition {
        Transition::None
    }

    /// Handle a trigger while active
    fn on_trigger(&mut self, _trigger: Trigger, _ctx: &mut ActionContext<'_>) -> Transition {
        Transition::None
    }

    /// Run once when discarded
    fn exit(&mut self, _ctx: &mut ActionContext<'_>) {}
}
