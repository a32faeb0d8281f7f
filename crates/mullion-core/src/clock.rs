use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond tick source driving repeat timers and the pacer.
pub trait Clock {
    fn ticks(&self) -> u64;
}

/// Wall clock, anchored where it was created.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn ticks(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A test clock you can drive deterministically. Clones share the same
/// time, so a copy can go to the runtime and another to the test body.
#[derive(Clone, Default)]
pub struct TestClock {
    t: Rc<Cell<u64>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        self.t.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.t.set(self.t.get() + ms);
    }
}

impl Clock for TestClock {
    fn ticks(&self) -> u64 {
        self.t.get()
    }
}
