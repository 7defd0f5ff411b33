//! Animation playback interface
//!
//! Action states only ask for named clips and a facing. Sprite sheets and
//! frame timing belong to the host's renderer behind [`Animator`].

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::actions::Command;

/// Completion callback fired once when a non-looping clip ends
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Horizontal facing of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left
    Left,
    /// Facing right
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal command
    pub fn from_command(command: Command) -> Option<Self> {
        match command {
            Command::Left => Some(Self::Left),
            Command::Right => Some(Self::Right),
            _ => None,
        }
    }

    /// Sign of lateral motion toward this facing: left is +y
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }

    /// Command that moves toward this facing
    pub fn command(self) -> Command {
        match self {
            Self::Left => Command::Left,
            Self::Right => Command::Right,
        }
    }
}

/// How a clip is played
pub struct PlayOptions {
    /// Keep playing after the last frame
    pub loops: bool,
    /// Frame looping restarts from
    pub loop_frame: usize,
    /// Frame that fires `on_complete`; `None` means the last frame
    pub callback_frame: Option<usize>,
    /// Fired once when the clip reaches `callback_frame`
    pub on_complete: Option<CompletionCallback>,
}

impl PlayOptions {
    /// Loop the whole clip
    pub fn looping() -> Self {
        Self {
            loops: true,
            loop_frame: 0,
            callback_frame: None,
            on_complete: None,
        }
    }

    /// Play once and hold the last frame
    pub fn once() -> Self {
        Self {
            loops: false,
            ..Self::looping()
        }
    }

    /// Loop from `frame` after the first pass
    pub fn loop_from(mut self, frame: usize) -> Self {
        self.loops = true;
        self.loop_frame = frame;
        self
    }

    /// Fire `callback` when the clip completes
    pub fn on_complete(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self::looping()
    }
}

impl fmt::Debug for PlayOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayOptions")
            .field("loops", &self.loops)
            .field("loop_frame", &self.loop_frame)
            .field("callback_frame", &self.callback_frame)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Presentation side of an entity
pub trait Animator: Send {
    /// Start a named clip, replacing the current one
    fn play(&mut self, name: &str, options: PlayOptions);

    /// Mirror the sprite toward `facing`
    fn set_flip(&mut self, facing: Facing);

    /// Advance playback
    fn update(&mut self, _dt: f32) {}
}

/// Shared record of clip names played by a [`HeadlessAnimator`]
pub type PlayLog = Arc<Mutex<Vec<String>>>;

/// Animator without a renderer.
///
/// Every non-looping clip lasts `clip_length` seconds; its completion callback
/// fires from `update` or from an explicit `finish`.
pub struct HeadlessAnimator {
    log: PlayLog,
    current: Option<String>,
    facing: Facing,
    clip_length: f32,
    elapsed: f32,
    loops: bool,
    pending: Option<CompletionCallback>,
}

impl HeadlessAnimator {
    /// Create an animator whose one-shot clips last `clip_length` seconds
    pub fn new(clip_length: f32) -> Self {
        Self {
            log: PlayLog::default(),
            current: None,
            facing: Facing::default(),
            clip_length,
            elapsed: 0.0,
            loops: true,
            pending: None,
        }
    }

    /// Handle to the play history
    pub fn log(&self) -> PlayLog {
        Arc::clone(&self.log)
    }

    /// Clip currently playing
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Current facing
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// True if a completion callback is waiting
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Complete the current clip now, firing its callback
    pub fn finish(&mut self) {
        if let Some(callback) = self.pending.take() {
            trace!("clip {:?} complete", self.current);
            callback();
        }
    }
}

impl Default for HeadlessAnimator {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl fmt::Debug for HeadlessAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessAnimator")
            .field("current", &self.current)
            .field("facing", &self.facing)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl Animator for HeadlessAnimator {
    fn play(&mut self, name: &str, options: PlayOptions) {
        trace!("play {} {:?}", name, options);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());
        self.current = Some(name.to_string());
        self.elapsed = 0.0;
        self.loops = options.loops;
        self.pending = options.on_complete;
    }

    fn set_flip(&mut self, facing: Facing) {
        self.facing = facing;
    }

    fn update(&mut self, dt: f32) {
        if self.loops || self.pending.is_none() {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.clip_length {
            self.finish();
        }
    }
}
