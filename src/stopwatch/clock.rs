use tokio::time::Instant;

/// Source of monotonic milliseconds for the stopwatch.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the clock was created, backed by tokio's `Instant` so paused
/// test runtimes drive it too.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
pub use manual::ManualClock;
