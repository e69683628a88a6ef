use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// How often the display is refreshed while the stopwatch runs.
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    pub start_on_launch: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(10),
            start_on_launch: false,
        }
    }
}

/// How a split compares against every other non-first split recorded so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitClass {
    Best,
    Worst,
    Regular,
}

impl SplitClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitClass::Best => "best",
            SplitClass::Worst => "worst",
            SplitClass::Regular => "regular",
        }
    }
}

/// A single recorded lap. Never mutated after it is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    pub index: u32,
    pub cumulative_ms: u64,
    pub split_ms: u64,
}

/// Payload handed to presentation layers every time a lap is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapRecorded {
    pub index: u32,
    pub cumulative_ms: u64,
    pub split_ms: u64,
    pub classification: SplitClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StopwatchEvent {
    Started {
        elapsed_ms: u64,
    },
    Paused {
        elapsed_ms: u64,
    },
    Reset,
    Tick {
        elapsed_ms: u64,
    },
    LapRecorded(LapRecorded),
    /// A lap was requested while the stopwatch was not running.
    LapIgnored,
    Info {
        message: String,
    },
}

/// Snapshot of the lap history used for JSON/CSV exports and the text summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LapSheet {
    pub exported_at_utc: String,
    pub total_ms: u64,
    pub laps: Vec<Lap>,
    pub best_split_ms: Option<u64>,
    pub worst_split_ms: Option<u64>,
    pub mean_split_ms: Option<f64>,
}
