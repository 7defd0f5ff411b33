//! Airborne states

use super::{direction_of, FallRecover};
use crate::actions::state::{ActionContext, ActionState, StateKind, StateSnapshot, Transition};
use crate::actions::trigger::{ButtonState, Command, Trigger};
use crate::animation::{Facing, PlayOptions};
use crate::foundation::math::Vec3;

fn lateral_force(y: f32) -> Vec3 {
    Vec3::new(0.0, y, 0.0)
}

/// Steer lateral velocity toward `target` with a force reapplied every tick
fn steer(target: f32, ctx: &mut ActionContext<'_>) {
    let body = ctx.body_mut();
    body.reset_forces();
    let correction = (target - body.velocity.y) * body.mass;
    body.apply_force(lateral_force(correction));
}

/// Rising after a jump impulse
#[derive(Debug, Default)]
pub struct Jump {
    jumps: u32,
}

impl Jump {
    /// Jump counter; the first ground jump counts 1 and each air jump 2
    pub fn jumps(&self) -> u32 {
        self.jumps
    }

    fn launch(&mut self, ctx: &mut ActionContext<'_>) {
        let grounded = ctx.grounded();
        let launch = if grounded && self.jumps == 0 {
            self.jumps = 1;
            true
        } else if !grounded && self.jumps <= ctx.profile.max_jumps {
            self.jumps += 2;
            true
        } else {
            false
        };

        if launch {
            let impulse = Vec3::new(0.0, 0.0, -ctx.profile.jump_strength);
            ctx.body_mut().apply_impulse(impulse);
        }
    }
}

impl ActionState for Jump {
    fn kind(&self) -> StateKind {
        StateKind::Jump
    }

    fn init(&mut self, _previous: Option<&StateSnapshot>, _ctx: &mut ActionContext<'_>) {
        self.jumps = 0;
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("jumping", PlayOptions::looping());
        self.launch(ctx);
    }

    fn update(&mut self, _dt: f32, ctx: &mut ActionContext<'_>) -> Transition {
        if ctx.velocity().z >= 0.0 || ctx.grounded() {
            Transition::Pop
        } else {
            Transition::None
        }
    }

    fn on_trigger(&mut self, trigger: Trigger, ctx: &mut ActionContext<'_>) -> Transition {
        if trigger.is_jump_press() {
            self.enter(Some(trigger), ctx);
            Transition::None
        } else if trigger.is_horizontal_press() {
            Transition::Push(Box::new(AirMove::default()), Some(trigger))
        } else {
            Transition::None
        }
    }
}

/// Descending with nothing underfoot
#[derive(Debug, Default)]
pub struct Fall;

impl ActionState for Fall {
    fn kind(&self) -> StateKind {
        StateKind::Fall
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("falling", PlayOptions::looping());
    }

    fn update(&mut self, _dt: f32, ctx: &mut ActionContext<'_>) -> Transition {
        if !(ctx.landed() || ctx.grounded()) {
            return Transition::None;
        }
        if ctx.body().lateral_speed() >= ctx.profile.initial_walk_speed {
            Transition::Replace(Box::new(FallRecover::default()), None)
        } else {
            Transition::Pop
        }
    }

    fn on_trigger(&mut self, trigger: Trigger, _ctx: &mut ActionContext<'_>) -> Transition {
        if trigger.is_horizontal_press() {
            Transition::Push(Box::new(AirMove::default()), Some(trigger))
        } else {
            Transition::None
        }
    }
}

/// Lateral steering while airborne
#[derive(Debug, Default)]
pub struct AirMove {
    direction: Option<Facing>,
    target: f32,
}

impl AirMove {
    /// Signed lateral speed being steered toward
    pub fn target(&self) -> f32 {
        self.target
    }
}

impl ActionState for AirMove {
    fn kind(&self) -> StateKind {
        StateKind::AirMove
    }

    fn enter(&mut self, trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        let direction = direction_of(trigger, *ctx.facing);
        ctx.face(direction);
        self.direction = Some(direction);
        self.target = direction.sign() * ctx.profile.max_speed * ctx.profile.air_speed_multiplier;

        let body = ctx.body_mut();
        let force = self.target * body.mass;
        body.apply_force(lateral_force(force));
    }

    #[allow(clippy::float_cmp)]
    fn update(&mut self, _dt: f32, ctx: &mut ActionContext<'_>) -> Transition {
        steer(self.target, ctx);
        if ctx.landed() || ctx.grounded() || ctx.velocity().z == 0.0 {
            Transition::Pop
        } else {
            Transition::None
        }
    }

    fn on_trigger(&mut self, trigger: Trigger, _ctx: &mut ActionContext<'_>) -> Transition {
        let own = self.direction.map(Facing::command) == Some(trigger.command);
        match trigger.state {
            ButtonState::Released if own => Transition::Pop,
            ButtonState::Pressed if trigger.command == Command::Action2 => {
                Transition::Push(Box::new(WallGrab::default()), Some(trigger))
            }
            _ => Transition::None,
        }
    }

    fn exit(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.body_mut().reset_forces();
    }
}

/// Pressing against a wall to stick to it.
///
/// Pushed over [`AirMove`]; the direction comes from the trigger that started
/// the air move, not from the Action2 press that starts the grab.
#[derive(Debug, Default)]
pub struct WallGrab {
    trigger: Option<Trigger>,
    direction: Option<Facing>,
    target: f32,
}

impl ActionState for WallGrab {
    fn kind(&self) -> StateKind {
        StateKind::WallGrab
    }

    fn init(&mut self, previous: Option<&StateSnapshot>, _ctx: &mut ActionContext<'_>) {
        self.trigger = previous.and_then(|snapshot| snapshot.trigger);
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        let direction = direction_of(self.trigger, *ctx.facing);
        self.direction = Some(direction);
        self.target = direction.sign() * ctx.profile.wallgrab_force;

        let body = ctx.body_mut();
        let force = self.target * body.mass;
        body.apply_force(lateral_force(force));
    }

    fn update(&mut self, _dt: f32, ctx: &mut ActionContext<'_>) -> Transition {
        steer(self.target, ctx);
        Transition::None
    }

    fn on_trigger(&mut self, trigger: Trigger, _ctx: &mut ActionContext<'_>) -> Transition {
        let own = self.direction.map(Facing::command) == Some(trigger.command);
        if trigger.state == ButtonState::Released && (own || trigger.command == Command::Action2) {
            Transition::Pop
        } else {
            Transition::None
        }
    }

    fn exit(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.body_mut().reset_forces();
    }
}
