//! Per-entity stack of action states

use log::debug;

use super::state::{ActionContext, ActionState, Phase, StateKind, StateSnapshot, Transition};
use super::trigger::Trigger;

#[derive(Debug)]
struct Frame {
    state: Box<dyn ActionState>,
    trigger: Option<Trigger>,
    phase: Phase,
}

impl Frame {
    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            kind: self.state.kind(),
            trigger: self.trigger,
        }
    }
}

/// LIFO collection of action states; only the top is active
#[derive(Debug, Default)]
pub struct ActionStack {
    frames: Vec<Frame>,
}

impl ActionStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True with no states
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Kind of the active state
    pub fn active(&self) -> Option<StateKind> {
        self.frames.last().map(|frame| frame.state.kind())
    }

    /// Kinds from bottom to top
    pub fn kinds(&self) -> Vec<StateKind> {
        self.frames.iter().map(|frame| frame.state.kind()).collect()
    }

    /// Phases from bottom to top
    pub fn phases(&self) -> Vec<Phase> {
        self.frames.iter().map(|frame| frame.phase).collect()
    }

    /// Suspend the active state and activate `state`
    pub fn push(&mut self, state: Box<dyn ActionState>, trigger: Option<Trigger>, ctx: &mut ActionContext<'_>) {
        let previous = self.frames.last().map(Frame::snapshot);
        if let Some(top) = self.frames.last_mut() {
            top.phase = Phase::Suspended;
        }

        let mut frame = Frame {
            state,
            trigger,
            phase: Phase::Uninitialized,
        };
        frame.state.init(previous.as_ref(), ctx);
        frame.phase = Phase::Active;
        frame.state.enter(trigger, ctx);

        debug!("{:?}: push {:?} over {:?}", ctx.entity, frame.state.kind(), previous.map(|p| p.kind));
        self.frames.push(frame);
    }

    /// Discard the active state and resume the one below.
    ///
    /// Popping the last state is a no-op and returns false.
    pub fn pop(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        if self.frames.len() <= 1 {
            return false;
        }
        self.discard_top(ctx);
        true
    }

    /// Exit every state, top first
    pub fn clear(&mut self, ctx: &mut ActionContext<'_>) {
        while !self.frames.is_empty() {
            self.discard_top(ctx);
        }
    }

    fn discard_top(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(mut frame) = self.frames.pop() else {
            return;
        };
        frame.state.exit(ctx);
        frame.phase = Phase::Exited;

        if let Some(top) = self.frames.last_mut() {
            top.phase = Phase::Active;
        }
        debug!(
            "{:?}: pop {:?} ({:?}), resume {:?}",
            ctx.entity,
            frame.state.kind(),
            frame.phase,
            self.active()
        );
    }

    /// Deliver a trigger to the active state
    pub fn handle_trigger(&mut self, trigger: Trigger, ctx: &mut ActionContext<'_>) {
        let transition = match self.frames.last_mut() {
            Some(top) => top.state.on_trigger(trigger, ctx),
            None => return,
        };
        self.apply(transition, ctx);
    }

    /// Tick the active state
    pub fn update(&mut self, dt: f32, ctx: &mut ActionContext<'_>) {
        let transition = match self.frames.last_mut() {
            Some(top) => top.state.update(dt, ctx),
            None => return,
        };
        self.apply(transition, ctx);
    }

    /// Carry out a transition
    pub fn apply(&mut self, transition: Transition, ctx: &mut ActionContext<'_>) {
        match transition {
            Transition::None => {}
            Transition::Pop => {
                self.pop(ctx);
            }
            Transition::Push(state, trigger) => self.push(state, trigger, ctx),
            Transition::Replace(state, trigger) => {
                self.discard_top(ctx);
                self.push(state, trigger, ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::states::harness::Harness;
    use crate::actions::trigger::Command;
    use std::sync::{Arc, Mutex};

    type Events = Arc<Mutex<Vec<String>>>;

    #[derive(Debug)]
    struct Probe {
        name: &'static str,
        events: Events,
        pop_on_update: bool,
    }

    impl Probe {
        fn new(name: &'static str, events: &Events) -> Self {
            Self {
                name,
                events: Arc::clone(events),
                pop_on_update: false,
            }
        }

        fn record(&self, what: &str) {
            self.events.lock().unwrap().push(format!("{} {what}", self.name));
        }
    }

    impl ActionState for Probe {
        fn kind(&self) -> StateKind {
            StateKind::Idle
        }

        fn init(&mut self, previous: Option<&StateSnapshot>, _ctx: &mut ActionContext<'_>) {
            let below = previous.and_then(|p| p.trigger).map(|t| format!("{:?}", t.command));
            self.record(&format!("init {}", below.unwrap_or_default()));
        }

        fn enter(&mut self, _trigger: Option<Trigger>, _ctx: &mut ActionContext<'_>) {
            self.record("enter");
        }

        fn update(&mut self, _dt: f32, _ctx: &mut ActionContext<'_>) -> Transition {
            if self.pop_on_update {
                Transition::Pop
            } else {
                Transition::None
            }
        }

        fn exit(&mut self, _ctx: &mut ActionContext<'_>) {
            self.record("exit");
        }
    }

    fn events(events: &Events) -> Vec<String> {
        std::mem::take(&mut *events.lock().unwrap())
    }

    #[test]
    fn test_push_suspends_and_pop_resumes() {
        let log = Events::default();
        let mut h = Harness::grounded();
        h.push(Probe::new("a", &log), Some(Trigger::pressed(Command::Left)));
        h.push(Probe::new("b", &log), None);

        assert_eq!(events(&log), vec!["a init ", "a enter", "b init Left", "b enter"]);
        assert_eq!(h.stack.phases(), vec![Phase::Suspended, Phase::Active]);

        assert!(h.pop());
        assert_eq!(events(&log), vec!["b exit"]);
        assert_eq!(h.stack.phases(), vec![Phase::Active]);
    }

    #[test]
    fn test_last_state_cannot_pop() {
        let log = Events::default();
        let mut h = Harness::grounded();
        h.push(Probe::new("a", &log), None);
        assert!(!h.pop());
        assert_eq!(h.stack.len(), 1);
        assert!(!events(&log).contains(&"a exit".to_string()));
    }

    #[test]
    fn test_update_transition_exits_once() {
        let log = Events::default();
        let mut h = Harness::grounded();
        h.push(Probe::new("a", &log), None);
        let mut top = Probe::new("b", &log);
        top.pop_on_update = true;
        h.push(top, None);
        events(&log);

        h.tick();
        h.tick();
        assert_eq!(events(&log), vec!["b exit"]);
        assert_eq!(h.stack.len(), 1);
    }

    #[test]
    fn test_empty_stack_ignores_input() {
        let mut h = Harness::grounded();
        h.trigger(Trigger::pressed(Command::Up));
        h.tick();
        assert!(h.stack.is_empty());
        assert_eq!(h.stack.active(), None);
    }
}
