//! Cooperative timed sequences
//!
//! A sequence is a plain state object (elapsed time, duration, start/end
//! values) advanced once per tick by whoever owns it. Cancelling a sequence
//! is immediate and snaps it to its resting value.

/// Lifecycle of a timed sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Running,
    Finished,
    Cancelled,
}

/// A resumable computation advanced once per tick
pub trait Sequence {
    /// Advance by `dt` seconds and return the resulting state.
    /// Advancing a sequence that is no longer running does nothing.
    fn advance(&mut self, dt: f32) -> SequenceState;

    /// Stop immediately and snap to the resting value
    fn cancel(&mut self);

    /// Current state
    fn state(&self) -> SequenceState;

    fn is_running(&self) -> bool {
        self.state() == SequenceState::Running
    }
}

/// Linear interpolation of a scalar (alpha fades)
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    state: SequenceState,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        let state = if duration <= 0.0 {
            SequenceState::Finished
        } else {
            SequenceState::Running
        };
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            state,
        }
    }

    /// Current value. Finished and cancelled fades rest at the target.
    pub fn value(&self) -> f32 {
        match self.state {
            SequenceState::Running => {
                let t = (self.elapsed / self.duration).min(1.0);
                self.from + (self.to - self.from) * t
            }
            SequenceState::Finished | SequenceState::Cancelled => self.to,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }
}

impl Sequence for Fade {
    fn advance(&mut self, dt: f32) -> SequenceState {
        if self.state != SequenceState::Running {
            return self.state;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.state = SequenceState::Finished;
        }
        self.state
    }

    fn cancel(&mut self) {
        if self.state == SequenceState::Running {
            self.state = SequenceState::Cancelled;
        }
    }

    fn state(&self) -> SequenceState {
        self.state
    }
}

/// Letter-by-letter text reveal
#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    text: String,
    chars_per_second: f32,
    total_chars: usize,
    elapsed: f32,
    state: SequenceState,
}

impl Reveal {
    /// A non-positive speed reveals the whole text at once
    pub fn new(text: impl Into<String>, chars_per_second: f32) -> Self {
        let text = text.into();
        let total_chars = text.chars().count();
        let state = if chars_per_second <= 0.0 || total_chars == 0 {
            SequenceState::Finished
        } else {
            SequenceState::Running
        };
        Self {
            text,
            chars_per_second,
            total_chars,
            elapsed: 0.0,
            state,
        }
    }

    /// Number of characters currently visible
    pub fn visible_chars(&self) -> usize {
        match self.state {
            SequenceState::Running => {
                ((self.elapsed * self.chars_per_second) as usize).min(self.total_chars)
            }
            SequenceState::Finished | SequenceState::Cancelled => self.total_chars,
        }
    }

    /// The visible prefix of the text
    pub fn visible_text(&self) -> &str {
        let n = self.visible_chars();
        match self.text.char_indices().nth(n) {
            Some((byte_index, _)) => &self.text[..byte_index],
            None => &self.text,
        }
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }
}

impl Sequence for Reveal {
    fn advance(&mut self, dt: f32) -> SequenceState {
        if self.state != SequenceState::Running {
            return self.state;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed * self.chars_per_second >= self.total_chars as f32 {
            self.state = SequenceState::Finished;
        }
        self.state
    }

    fn cancel(&mut self) {
        if self.state == SequenceState::Running {
            self.state = SequenceState::Cancelled;
        }
    }

    fn state(&self) -> SequenceState {
        self.state
    }
}

/// Endless vertical oscillation, rests at zero offset
#[derive(Debug, Clone, PartialEq)]
pub struct Bounce {
    speed: f32,
    height: f32,
    elapsed: f32,
    state: SequenceState,
}

impl Bounce {
    pub fn new(speed: f32, height: f32) -> Self {
        Self {
            speed,
            height,
            elapsed: 0.0,
            state: SequenceState::Running,
        }
    }

    pub fn offset(&self) -> f32 {
        match self.state {
            SequenceState::Running => (self.elapsed * self.speed).sin() * self.height,
            SequenceState::Finished | SequenceState::Cancelled => 0.0,
        }
    }
}

impl Sequence for Bounce {
    fn advance(&mut self, dt: f32) -> SequenceState {
        if self.state == SequenceState::Running {
            self.elapsed += dt.max(0.0);
        }
        self.state
    }

    fn cancel(&mut self) {
        if self.state == SequenceState::Running {
            self.state = SequenceState::Cancelled;
        }
    }

    fn state(&self) -> SequenceState {
        self.state
    }
}

/// Waits for a fixed duration
#[derive(Debug, Clone, PartialEq)]
pub struct Delay {
    duration: f32,
    elapsed: f32,
    state: SequenceState,
}

impl Delay {
    pub fn new(duration: f32) -> Self {
        let state = if duration <= 0.0 {
            SequenceState::Finished
        } else {
            SequenceState::Running
        };
        Self {
            duration,
            elapsed: 0.0,
            state,
        }
    }
}

impl Sequence for Delay {
    fn advance(&mut self, dt: f32) -> SequenceState {
        if self.state != SequenceState::Running {
            return self.state;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            self.state = SequenceState::Finished;
        }
        self.state
    }

    fn cancel(&mut self) {
        if self.state == SequenceState::Running {
            self.state = SequenceState::Cancelled;
        }
    }

    fn state(&self) -> SequenceState {
        self.state
    }
}

/// Holds at most one sequence. Starting a new one cancels the previous.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<S: Sequence> {
    current: Option<S>,
}

impl<S: Sequence> Track<S> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Replace the current sequence, cancelling it first if still running
    pub fn start(&mut self, sequence: S) {
        self.cancel();
        self.current = Some(sequence);
    }

    /// Advance the current sequence, if any
    pub fn advance(&mut self, dt: f32) -> Option<SequenceState> {
        self.current.as_mut().map(|s| s.advance(dt))
    }

    /// Cancel the current sequence. It stays readable at its resting value.
    pub fn cancel(&mut self) {
        if let Some(sequence) = self.current.as_mut() {
            sequence.cancel();
        }
    }

    /// Drop the current sequence entirely
    pub fn clear(&mut self) {
        self.cancel();
        self.current = None;
    }

    pub fn get(&self) -> Option<&S> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|s| s.is_running())
    }
}

impl<S: Sequence> Default for Track<S> {
    fn default() -> Self {
        Self::new()
    }
}
