//! Elapsed-time accounting for a pausable stopwatch.
//!
//! All times are integer milliseconds on a caller-supplied monotonic clock.
//! Nothing here reads the clock itself, which keeps the state machine pure.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerState {
    Stopped,
    Running,
}

#[derive(Debug, Clone)]
pub struct TimerCore {
    state: TimerState,
    /// Clock reading such that `elapsed = now - reference_start` while running.
    /// Meaningless while stopped.
    reference_start: i64,
    /// Authoritative elapsed value while stopped.
    accumulated: u64,
}

impl Default for TimerCore {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerCore {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            reference_start: 0,
            accumulated: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Start, or resume from the accumulated value. Redundant starts are ignored.
    pub fn start(&mut self, now_ms: u64) {
        if self.is_running() {
            return;
        }
        // Signed: the clock may read less than the time already accumulated.
        self.reference_start = now_ms as i64 - self.accumulated as i64;
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self, now_ms: u64) {
        if !self.is_running() {
            return;
        }
        self.accumulated = self.current_elapsed(now_ms);
        self.state = TimerState::Stopped;
    }

    pub fn reset(&mut self) {
        self.accumulated = 0;
        self.reference_start = 0;
        self.state = TimerState::Stopped;
    }

    pub fn toggle(&mut self, now_ms: u64) {
        if self.is_running() {
            self.pause(now_ms);
        } else {
            self.start(now_ms);
        }
    }

    pub fn current_elapsed(&self, now_ms: u64) -> u64 {
        match self.state {
            TimerState::Running => (now_ms as i64 - self.reference_start).max(0) as u64,
            TimerState::Stopped => self.accumulated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_pause_resume() {
        let mut t = TimerCore::new();
        assert!(!t.is_running());
        assert_eq!(t.current_elapsed(0), 0);

        t.start(1_000);
        assert!(t.is_running());
        assert_eq!(t.current_elapsed(1_500), 500);
        assert_eq!(t.current_elapsed(2_000), 1_000);

        t.pause(2_000);
        assert!(!t.is_running());
        assert_eq!(t.current_elapsed(9_000), 1_000); // frozen while paused

        t.start(9_000);
        assert_eq!(t.current_elapsed(9_000), 1_000);
        assert_eq!(t.current_elapsed(9_250), 1_250);
    }

    #[test]
    fn test_redundant_calls_are_noops() {
        let mut t = TimerCore::new();
        t.pause(500);
        assert_eq!(t.current_elapsed(500), 0);

        t.start(1_000);
        t.start(1_800); // must not rebase
        assert_eq!(t.current_elapsed(2_000), 1_000);

        t.pause(2_000);
        t.pause(3_000);
        assert_eq!(t.current_elapsed(4_000), 1_000);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut t = TimerCore::new();
        t.start(0);
        t.reset();
        assert!(!t.is_running());
        assert_eq!(t.current_elapsed(10_000), 0);

        t.start(100);
        t.pause(600);
        t.reset();
        assert_eq!(t.current_elapsed(10_000), 0);
    }

    #[test]
    fn test_toggle() {
        let mut t = TimerCore::new();
        t.toggle(0);
        assert!(t.is_running());
        t.toggle(300);
        assert!(!t.is_running());
        assert_eq!(t.current_elapsed(1_000), 300);
    }

    #[test]
    fn test_pause_resume_cycles_preserve_time() {
        let mut t = TimerCore::new();
        let mut now = 0;
        let mut expected = 0;
        for (run, idle) in [(120, 40), (7, 1_000), (3_333, 0), (1, 1)] {
            t.start(now);
            now += run;
            expected += run;
            t.pause(now);
            assert_eq!(t.current_elapsed(now), expected);
            now += idle;
            assert_eq!(t.current_elapsed(now), expected);
        }
    }

    #[test]
    fn test_monotonic_while_running() {
        let mut t = TimerCore::new();
        t.start(50);
        let mut last = 0;
        for now in (50..5_000).step_by(37) {
            let e = t.current_elapsed(now);
            assert!(e >= last);
            last = e;
        }
    }

    #[test]
    fn test_resume_with_clock_behind_accumulated() {
        let mut t = TimerCore::new();
        t.start(0);
        t.pause(5_000);
        // Clock source restarted near zero.
        t.start(2_000);
        assert_eq!(t.current_elapsed(2_000), 5_000);
        assert_eq!(t.current_elapsed(2_500), 5_500);
    }
}
