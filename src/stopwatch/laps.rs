//! Lap history and split classification.

use crate::model::{Lap, LapRecorded, SplitClass};

#[derive(Debug, Clone, Default)]
pub struct LapTracker {
    history: Vec<Lap>,
}

impl LapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lap taken at `cumulative_ms` and classify its split against
    /// every non-first split recorded so far, itself included.
    pub fn record_lap(&mut self, cumulative_ms: u64) -> LapRecorded {
        let index = self.history.len() as u32 + 1;
        let split_ms = match self.history.last() {
            Some(prev) => cumulative_ms.saturating_sub(prev.cumulative_ms),
            None => cumulative_ms,
        };
        self.history.push(Lap {
            index,
            cumulative_ms,
            split_ms,
        });

        LapRecorded {
            index,
            cumulative_ms,
            split_ms,
            classification: self.classify_split(index, split_ms),
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn count(&self) -> usize {
        self.history.len()
    }

    pub fn laps(&self) -> &[Lap] {
        &self.history
    }

    /// Splits that take part in best/worst comparison. Lap 1 is the baseline.
    pub fn comparable_splits(&self) -> impl Iterator<Item = u64> + '_ {
        self.history.iter().skip(1).map(|l| l.split_ms)
    }

    pub fn best_split(&self) -> Option<u64> {
        self.comparable_splits().min()
    }

    pub fn worst_split(&self) -> Option<u64> {
        self.comparable_splits().max()
    }

    /// Classify lap `index` against the current history. Unlike the tag frozen
    /// in `LapRecorded`, this reflects laps recorded after it.
    pub fn classify(&self, index: u32) -> Option<SplitClass> {
        let lap = self.history.get((index as usize).checked_sub(1)?)?;
        Some(self.classify_split(lap.index, lap.split_ms))
    }

    fn classify_split(&self, index: u32, split_ms: u64) -> SplitClass {
        if index <= 1 {
            return SplitClass::Regular;
        }
        let comparable = self.history.len().saturating_sub(1);
        // Best is checked first so a lone split, or a field of equal splits, is Best.
        if Some(split_ms) == self.best_split() {
            SplitClass::Best
        } else if Some(split_ms) == self.worst_split() && comparable > 1 {
            SplitClass::Worst
        } else {
            SplitClass::Regular
        }
    }
}
