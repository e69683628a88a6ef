//! Text summary builder for CLI output.
//!
//! This module computes split metrics and formats human-readable lines for text mode.

use crate::metrics;
use crate::model::{LapRecorded, LapSheet, SplitClass, StopwatchEvent};
use crate::stopwatch::{format_split, format_time_display, LapTracker};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// One line for a live event in text mode. Ticks produce nothing.
pub(crate) fn event_line(ev: &StopwatchEvent) -> Option<String> {
    match ev {
        StopwatchEvent::Started { elapsed_ms } => {
            Some(format!("Running  {}", format_time_display(*elapsed_ms)))
        }
        StopwatchEvent::Paused { elapsed_ms } => {
            Some(format!("Paused   {}", format_time_display(*elapsed_ms)))
        }
        StopwatchEvent::Reset => Some(format!("Ready    {}", format_time_display(0))),
        StopwatchEvent::Tick { .. } => None,
        StopwatchEvent::LapRecorded(lap) => Some(lap_line(lap)),
        StopwatchEvent::LapIgnored => Some("Lap ignored: stopwatch is not running".into()),
        StopwatchEvent::Info { message } => Some(message.clone()),
    }
}

fn lap_line(lap: &LapRecorded) -> String {
    let tag = match lap.classification {
        SplitClass::Regular => String::new(),
        class => format!("  ({})", class.as_str()),
    };
    format!(
        "Lap {:<3} {}  {}{}",
        lap.index,
        format_time_display(lap.cumulative_ms),
        format_split(lap.split_ms),
        tag
    )
}

/// Build the end-of-session summary. Lap marks reflect the final best/worst.
pub(crate) fn build_text_summary(sheet: &LapSheet) -> TextSummary {
    let mut lines = vec![format!("Total: {}", format_time_display(sheet.total_ms))];

    let mut tracker = LapTracker::new();
    for lap in &sheet.laps {
        tracker.record_lap(lap.cumulative_ms);
    }
    lines.push(format!("Laps: {}", tracker.count()));

    for lap in tracker.laps() {
        let class = tracker.classify(lap.index).unwrap_or(SplitClass::Regular);
        lines.push(lap_line(&LapRecorded {
            index: lap.index,
            cumulative_ms: lap.cumulative_ms,
            split_ms: lap.split_ms,
            classification: class,
        }));
    }

    if let (Some(best), Some(worst)) = (tracker.best_split(), tracker.worst_split()) {
        lines.push(format!(
            "Best split: {}  Worst split: {}",
            format_time_display(best),
            format_time_display(worst)
        ));
    }

    let splits: Vec<u64> = tracker.comparable_splits().collect();
    if let Some((mean, median, p25, p75)) = metrics::compute_split_metrics(&splits) {
        lines.push(format!(
            "Splits: avg {} med {} p25 {} p75 {}",
            format_time_display(mean.round() as u64),
            format_time_display(median as u64),
            format_time_display(p25 as u64),
            format_time_display(p75 as u64)
        ));
    }

    TextSummary { lines }
}
