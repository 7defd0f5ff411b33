//! Landing recovery and death

use crate::actions::state::{ActionContext, ActionState, StateKind, Transition};
use crate::actions::trigger::Trigger;
use crate::animation::PlayOptions;

/// Crouched absorb after landing at speed
#[derive(Debug, Default)]
pub struct FallRecover {
    held_rate: f32,
}

impl ActionState for FallRecover {
    fn kind(&self) -> StateKind {
        StateKind::FallRecover
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("crouch", PlayOptions::looping().loop_from(4));
        self.held_rate = ctx.motor.rate;
        ctx.motor.rate = 0.0;

        let divisor = ctx.profile.fall_recover_divisor;
        let height = ctx.profile.crouch_height();
        let body = ctx.body_mut();
        body.velocity.y /= divisor;
        body.resize_height(height);
    }

    fn update(&mut self, _dt: f32, ctx: &mut ActionContext<'_>) -> Transition {
        if ctx.body().lateral_speed() < ctx.profile.initial_walk_speed {
            Transition::Pop
        } else {
            Transition::None
        }
    }

    fn exit(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.motor.rate = self.held_rate;
        let height = ctx.profile.standing_height();
        ctx.body_mut().resize_height(height);
    }
}

/// Terminal state; ignores every trigger
#[derive(Debug, Default)]
pub struct Die;

impl ActionState for Die {
    fn kind(&self) -> StateKind {
        StateKind::Die
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("die", PlayOptions::looping().loop_from(2));
        ctx.motor.rate = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::states::harness::Harness;
    use crate::actions::states::{Idle, Move};
    use crate::actions::Command;
    use approx::assert_relative_eq;

    #[test]
    fn test_fall_recover_slows_and_crouches() {
        let mut h = Harness::grounded();
        h.push(Idle, None);
        h.body_mut().velocity.y = 150.0;
        h.push(FallRecover::default(), None);

        assert_relative_eq!(h.body().velocity.y, 150.0 / h.profile.fall_recover_divisor);
        assert_relative_eq!(h.body().volume.height(), h.profile.crouch_height());
        assert_eq!(h.animator.current(), Some("crouch"));

        assert!(h.pop());
        assert_relative_eq!(h.body().volume.height(), h.profile.standing_height());
    }

    #[test]
    fn test_fall_recover_ends_when_slow() {
        let mut h = Harness::grounded();
        h.push(Idle, None);
        h.body_mut().velocity.y = 300.0;
        h.push(FallRecover::default(), None);
        h.tick();
        assert_eq!(h.stack.active(), Some(StateKind::FallRecover));

        h.body_mut().velocity.y = 0.0;
        h.tick();
        assert_eq!(h.stack.active(), Some(StateKind::Idle));
    }

    #[test]
    fn test_fall_recover_holds_motor() {
        let mut h = Harness::grounded();
        h.push(Idle, None);
        h.push(Move::default(), Some(Trigger::pressed(Command::Left)));
        let rate = h.motor.rate;
        h.push(FallRecover::default(), None);
        assert_relative_eq!(h.motor.rate, 0.0);
        h.pop();
        assert_relative_eq!(h.motor.rate, rate);
    }

    #[test]
    fn test_die_ignores_triggers() {
        let mut h = Harness::grounded();
        h.push(Idle, None);
        h.push(Die, None);
        for command in Command::ALL {
            h.trigger(Trigger::pressed(command));
            h.trigger(Trigger::released(command));
        }
        assert_eq!(h.stack.kinds(), vec![StateKind::Idle, StateKind::Die]);
        assert_eq!(h.animator.current(), Some("die"));
    }
}
