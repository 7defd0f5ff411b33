//! Time management utilities

/// Session time advanced by explicit frame deltas; never reads the wall clock
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionClock {
    elapsed: f32,
    frames: u64,
}

impl SessionClock {
    /// Clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame of `delta` seconds
    pub fn tick(&mut self, delta: f32) {
        self.elapsed += delta;
        self.frames += 1;
    }

    /// Seconds of session time so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Frames counted so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Fixed-rate step accumulator.
///
/// Decouples the physics rate from the render rate: every outer frame feeds
/// its variable delta in and gets back how many fixed steps to run.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    max_steps: u32,
}

impl FixedTimestep {
    /// Create an accumulator for steps of `step` seconds, running at most
    /// `max_steps` per frame
    pub fn new(step: f32, max_steps: u32) -> Self {
        assert!(step > 0.0, "fixed timestep must be positive");
        Self {
            step,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    /// Length of one fixed step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed a frame delta and return how many fixed steps are due.
    ///
    /// Time beyond `max_steps` is dropped so a long stall cannot trigger a
    /// spiral of catch-up steps.
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        self.accumulator += frame_delta.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps {
            self.accumulator = self.accumulator.min(self.step);
        }
        steps
    }

    /// Fraction of a step left in the accumulator (for interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}

/// Per-frame facts handed to gameplay code explicitly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Presentation buffer size in pixels
    pub buffer_size: (u32, u32),
    /// Seconds since the session started
    pub elapsed: f32,
    /// Index of the current outer frame
    pub frame: u64,
}

impl FrameContext {
    /// Context for the first frame
    pub fn new(buffer_size: (u32, u32)) -> Self {
        Self {
            buffer_size,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Context for the frame after this one
    pub fn next(&self, delta_time: f32) -> Self {
        Self {
            buffer_size: self.buffer_size,
            elapsed: self.elapsed + delta_time,
            frame: self.frame + 1,
        }
    }
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new((0, 0))
    }
}
