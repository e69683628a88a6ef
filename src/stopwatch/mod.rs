//! Stopwatch core: elapsed-time state machine plus lap history.
//!
//! `Stopwatch` is the owned controller object that front ends drive. It reads
//! the clock once per operation and applies the cross-component rules: reset
//! clears the laps, and laps are only taken while running.

mod clock;
mod format;
mod laps;
mod timer;

pub use clock::{Clock, MonotonicClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use format::{format_split, format_time_display};
#[cfg(feature = "tui")]
pub use format::lap_indicator;
pub use laps::LapTracker;
use timer::TimerCore;

use crate::model::{LapRecorded, LapSheet};

pub struct Stopwatch<C: Clock> {
    clock: C,
    timer: TimerCore,
    laps: LapTracker,
}

impl<C: Clock> Stopwatch<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            timer: TimerCore::new(),
            laps: LapTracker::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn start(&mut self) {
        self.timer.start(self.clock.now_ms());
    }

    pub fn pause(&mut self) {
        self.timer.pause(self.clock.now_ms());
    }

    pub fn toggle(&mut self) {
        self.timer.toggle(self.clock.now_ms());
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.laps.clear();
    }

    /// Record a lap at the current elapsed time. Returns `None` while stopped.
    pub fn lap(&mut self) -> Option<LapRecorded> {
        if !self.timer.is_running() {
            return None;
        }
        let elapsed = self.elapsed_ms();
        Some(self.laps.record_lap(elapsed))
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.timer.current_elapsed(self.clock.now_ms())
    }

    pub fn lap_count(&self) -> usize {
        self.laps.count()
    }

    /// Snapshot for exports. `exported_at_utc` is left for the caller to stamp.
    pub fn lap_sheet(&self) -> LapSheet {
        build_lap_sheet(&self.laps, self.elapsed_ms())
    }
}

/// Summarise a lap history into an export sheet.
pub fn build_lap_sheet(laps: &LapTracker, total_ms: u64) -> LapSheet {
    let splits: Vec<u64> = laps.comparable_splits().collect();
    LapSheet {
        exported_at_utc: String::new(),
        total_ms,
        laps: laps.laps().to_vec(),
        best_split_ms: laps.best_split(),
        worst_split_ms: laps.worst_split(),
        mean_split_ms: crate::metrics::mean_split(&splits),
    }
}
