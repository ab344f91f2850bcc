use std::{cell::Cell, rc::Rc};

use instant::Instant;

/// Monotonic elapsed-time source read once per tick.
pub trait Clock {
    /// Seconds since the clock was started. Never decreases.
    fn elapsed_secs(&self) -> f32;
}

/// Wall clock started on construction. It is never reset or paused.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the frame loop.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f32>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `secs`. Earlier times are ignored to keep the clock monotonic.
    pub fn set(&self, secs: f32) {
        if secs > self.now.get() {
            self.now.set(secs);
        }
    }

    pub fn advance(&self, secs: f32) {
        self.set(self.now.get() + secs.max(0.0));
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f32 {
        self.now.get()
    }
}
