//! Concrete action states
//!
//! Lateral motion is along y with +y toward [`Facing::Left`]; vertical motion
//! is along z with up negative.

mod air;
mod ground;
mod recover;

pub use air::{AirMove, Fall, Jump, WallGrab};
pub use ground::{Brake, Crouch, Idle, Move, Unbrake, Uncrouch};
pub use recover::{Die, FallRecover};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::trigger::Trigger;
use crate::animation::{Facing, PlayOptions};

/// Direction named by a horizontal trigger, else `fallback`
fn direction_of(trigger: Option<Trigger>, fallback: Facing) -> Facing {
    trigger
        .and_then(|trigger| Facing::from_command(trigger.command))
        .unwrap_or(fallback)
}

/// Set by an animation completion callback, polled by `update`
#[derive(Debug, Clone, Default)]
struct CompletionFlag(Arc<AtomicBool>);

impl CompletionFlag {
    fn play_once(&self) -> PlayOptions {
        let flag = Arc::clone(&self.0);
        PlayOptions::once().on_complete(move || flag.store(true, Ordering::Release))
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
pub(crate) mod harness {
    use crate::actions::{ActionContext, ActionStack, ActionState, Trigger};
    use crate::actor::{ActorProfile, EntityId, Motor};
    use crate::animation::{Animator, Facing, HeadlessAnimator};
    use crate::audio::SoundManager;
    use crate::core::config::PhysicsConfig;
    use crate::foundation::math::Vec3;
    use crate::foundation::time::FrameContext;
    use crate::physics::{Body, BodyHandle, Simulation};
    use crate::spatial::Rect;

    pub const DT: f32 = 1.0 / 60.0;

    /// One entity on a floor, with every service an action state needs
    pub struct Harness {
        pub simulation: Simulation,
        pub handle: BodyHandle,
        pub motor: Motor,
        pub profile: ActorProfile,
        pub facing: Facing,
        pub animator: HeadlessAnimator,
        pub audio: SoundManager,
        pub frame: FrameContext,
        pub stack: ActionStack,
    }

    impl Harness {
        /// Entity standing at z = 0 on a floor
        pub fn grounded() -> Self {
            let profile = ActorProfile::default();
            let floor = Rect::new(-1000, profile.size.z as i32, 2000, 16);
            let mut simulation = Simulation::from_rects(PhysicsConfig::default(), vec![], &[floor]);
            let handle = simulation.add(profile.spawn_body(Vec3::zeros()));
            simulation.step(DT);
            Self::with(simulation, handle, profile)
        }

        /// Entity high above any geometry
        pub fn airborne() -> Self {
            let profile = ActorProfile::default();
            let mut simulation = Simulation::new(PhysicsConfig::default(), vec![], vec![]);
            let handle = simulation.add(profile.spawn_body(Vec3::new(0.0, 0.0, -500.0)));
            Self::with(simulation, handle, profile)
        }

        fn with(simulation: Simulation, handle: BodyHandle, profile: ActorProfile) -> Self {
            Self {
                simulation,
                handle,
                motor: Motor::new(profile.motor_max_force),
                profile,
                facing: Facing::Right,
                animator: HeadlessAnimator::new(0.1),
                audio: SoundManager::new(),
                frame: FrameContext::new((320, 240)),
                stack: ActionStack::new(),
            }
        }

        fn split(&mut self) -> (&mut ActionStack, ActionContext<'_>) {
            let ctx = ActionContext {
                entity: EntityId(1),
                handle: self.handle,
                simulation: &mut self.simulation,
                motor: &mut self.motor,
                profile: &self.profile,
                facing: &mut self.facing,
                animator: &mut self.animator,
                audio: &mut self.audio,
                frame: &self.frame,
            };
            (&mut self.stack, ctx)
        }

        pub fn push(&mut self, state: impl ActionState + 'static, trigger: Option<Trigger>) {
            let (stack, mut ctx) = self.split();
            stack.push(Box::new(state), trigger, &mut ctx);
        }

        pub fn trigger(&mut self, trigger: Trigger) {
            let (stack, mut ctx) = self.split();
            stack.handle_trigger(trigger, &mut ctx);
        }

        pub fn pop(&mut self) -> bool {
            let (stack, mut ctx) = self.split();
            stack.pop(&mut ctx)
        }

        /// Motor, physics step, then state update
        pub fn tick(&mut self) {
            let body = &mut self.simulation[self.handle];
            if self.motor.apply(body, DT) {
                self.simulation.wake(self.handle);
            }
            if self.simulation[self.handle].force() != Vec3::zeros() {
                self.simulation.wake(self.handle);
            }
            self.simulation.step(DT);
            self.animator.update(DT);
            let (stack, mut ctx) = self.split();
            stack.update(DT, &mut ctx);
        }

        pub fn body(&self) -> &Body {
            &self.simulation[self.handle]
        }

        pub fn body_mut(&mut self) -> &mut Body {
            self.simulation.wake(self.handle);
            &mut self.simulation[self.handle]
        }

        pub fn clips(&self) -> Vec<String> {
            self.animator.log().lock().unwrap().clone()
        }
    }
}
