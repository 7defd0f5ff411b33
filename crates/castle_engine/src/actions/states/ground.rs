//! States for an entity on its feet

use super::{direction_of, CompletionFlag, Jump};
use crate::actions::state::{ActionContext, ActionState, StateKind, Transition};
use crate::actions::trigger::{ButtonState, Command, Trigger};
use crate::animation::{Facing, PlayOptions};

fn is_crouch_press(trigger: &Trigger) -> bool {
    trigger.command == Command::Down && trigger.is_pressed()
}

/// Standing still; the base state of every actor
#[derive(Debug, Default)]
pub struct Idle;

impl ActionState for Idle {
    fn kind(&self) -> StateKind {
        StateKind::Idle
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("idle", PlayOptions::looping());
    }

    fn on_trigger(&mut self, trigger: Trigger, _ctx: &mut ActionContext<'_>) -> Transition {
        if trigger.is_horizontal_press() {
            Transition::Push(Box::new(Move::default()), Some(trigger))
        } else if trigger.is_jump_press() {
            Transition::Push(Box::new(Jump::default()), Some(trigger))
        } else if is_crouch_press(&trigger) {
            Transition::Push(Box::new(Crouch::default()), Some(trigger))
        } else {
            Transition::None
        }
    }
}

/// Ground movement driven by the motor
#[derive(Debug, Default)]
pub struct Move {
    direction: Option<Facing>,
    max_speed: f32,
    clip: Option<&'static str>,
}

impl Move {
    /// Signed target speed chosen on entry
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }
}

impl ActionState for Move {
    fn kind(&self) -> StateKind {
        StateKind::Move
    }

    fn enter(&mut self, trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        let direction = direction_of(trigger, *ctx.facing);
        ctx.face(direction);
        self.direction = Some(direction);
        self.max_speed = direction.sign() * ctx.profile.max_speed;
        ctx.motor.rate = self.max_speed;
    }

    fn update(&mut self, _dt: f32, ctx: &mut ActionContext<'_>) -> Transition {
        let velocity = ctx.body().lateral_speed();
        let speed = self.max_speed.abs();
        let clip = if velocity > 0.0 && velocity < speed / 2.0 {
            Some("walk")
        } else if velocity >= speed / 2.0 && velocity < speed * 2.0 {
            Some("run")
        } else {
            None
        };
        if clip.is_some() && clip != self.clip {
            self.clip = clip;
            if let Some(name) = clip {
                ctx.play(name, PlayOptions::looping());
            }
        }
        Transition::None
    }

    fn on_trigger(&mut self, trigger: Trigger, _ctx: &mut ActionContext<'_>) -> Transition {
        let own = self.direction.map(Facing::command) == Some(trigger.command);
        match trigger.state {
            ButtonState::Released if own => Transition::Replace(Box::new(Brake), Some(trigger)),
            ButtonState::Pressed if trigger.command.is_horizontal() && !own => {
                Transition::Replace(Box::new(Move::default()), Some(trigger))
            }
            ButtonState::Pressed if trigger.command.is_jump() => {
                Transition::Push(Box::new(Jump::default()), Some(trigger))
            }
            ButtonState::Pressed if trigger.command == Command::Down => {
                Transition::Push(Box::new(Crouch::default()), Some(trigger))
            }
            _ => Transition::None,
        }
    }

    fn exit(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.motor.rate = 0.0;
    }
}

/// Sliding to a stop after releasing a direction
#[derive(Debug, Default)]
pub struct Brake;

impl ActionState for Brake {
    fn kind(&self) -> StateKind {
        StateKind::Brake
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("brake", PlayOptions::looping().loop_from(5));
        ctx.emit_sound("stop.wav");
    }

    fn update(&mut self, _dt: f32, ctx: &mut ActionContext<'_>) -> Transition {
        if ctx.body().lateral_speed() < ctx.profile.brake_stop_speed {
            Transition::Replace(Box::new(Unbrake::default()), None)
        } else {
            Transition::None
        }
    }

    fn on_trigger(&mut self, trigger: Trigger, _ctx: &mut ActionContext<'_>) -> Transition {
        if trigger.is_horizontal_press() {
            Transition::Replace(Box::new(Move::default()), Some(trigger))
        } else {
            Transition::None
        }
    }
}

/// Recovery animation after braking; ends with the clip
#[derive(Debug, Default)]
pub struct Unbrake {
    done: CompletionFlag,
}

impl ActionState for Unbrake {
    fn kind(&self) -> StateKind {
        StateKind::Unbrake
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("unbrake", self.done.play_once());
    }

    fn update(&mut self, _dt: f32, _ctx: &mut ActionContext<'_>) -> Transition {
        if self.done.is_set() {
            Transition::Pop
        } else {
            Transition::None
        }
    }
}

/// Crouched at half height
#[derive(Debug, Default)]
pub struct Crouch {
    held_rate: f32,
}

impl ActionState for Crouch {
    fn kind(&self) -> StateKind {
        StateKind::Crouch
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("crouch", PlayOptions::looping().loop_from(4));
        self.held_rate = ctx.motor.rate;
        ctx.motor.rate = 0.0;

        let height = ctx.profile.crouch_height();
        let body = ctx.body_mut();
        body.resize_height(height);
        body.velocity.y = 0.0;
    }

    fn on_trigger(&mut self, trigger: Trigger, _ctx: &mut ActionContext<'_>) -> Transition {
        if trigger == Trigger::released(Command::Down) {
            Transition::Replace(Box::new(Uncrouch::default()), Some(trigger))
        } else {
            Transition::None
        }
    }

    fn exit(&mut self, ctx: &mut ActionContext<'_>) {
        ctx.motor.rate = self.held_rate;
    }
}

/// Standing back up; ends with the clip
#[derive(Debug, Default)]
pub struct Uncrouch {
    done: CompletionFlag,
}

impl ActionState for Uncrouch {
    fn kind(&self) -> StateKind {
        StateKind::Uncrouch
    }

    fn enter(&mut self, _trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        ctx.play("uncrouch", self.done.play_once());
        let height = ctx.profile.standing_height();
        ctx.body_mut().resize_height(height);
    }

    fn update(&mut self, _dt: f32, _ctx: &mut ActionContext<'_>) -> Transition {
        if self.done.is_set() {
            Transition::Pop
        } else {
            Transition::None
        }
    }
}
