//! Lap sheet exports (JSON and CSV).

use crate::model::LapSheet;
use crate::stopwatch::{format_time_display, LapTracker};
use anyhow::{Context, Result};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Current UTC time in RFC 3339, or an empty string if formatting fails.
pub fn timestamp_utc() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Default file name for an export, based on the sheet timestamp.
#[cfg(feature = "tui")]
pub fn default_export_name(sheet: &LapSheet, ext: &str) -> String {
    let stamp = if sheet.exported_at_utc.is_empty() {
        "unstamped".to_string()
    } else {
        sheet
            .exported_at_utc
            .replace(':', "-")
            .replace('T', "_")
    };
    format!("lapwatch-{stamp}.{ext}")
}

/// Resolve a default export file in the current directory.
#[cfg(feature = "tui")]
pub fn default_export_path(sheet: &LapSheet, ext: &str) -> Result<std::path::PathBuf> {
    let current_dir = std::env::current_dir().context("get current directory")?;
    Ok(current_dir.join(default_export_name(sheet, ext)))
}

pub fn export_json(path: &Path, sheet: &LapSheet) -> Result<()> {
    let body = serde_json::to_string_pretty(sheet).context("serialize lap sheet")?;
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), laps = sheet.laps.len(), "exported JSON");
    Ok(())
}

pub fn export_csv(path: &Path, sheet: &LapSheet) -> Result<()> {
    std::fs::write(path, lap_sheet_csv(sheet))
        .with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), laps = sheet.laps.len(), "exported CSV");
    Ok(())
}

/// Render the sheet as CSV, one row per lap with its current classification.
pub fn lap_sheet_csv(sheet: &LapSheet) -> String {
    let mut tracker = LapTracker::new();
    for lap in &sheet.laps {
        tracker.record_lap(lap.cumulative_ms);
    }

    let mut out = String::from("lap,cumulative_ms,split_ms,cumulative,split,class\n");
    for lap in tracker.laps() {
        let class = tracker
            .classify(lap.index)
            .map(|c| c.as_str())
            .unwrap_or("regular");
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            lap.index,
            lap.cumulative_ms,
            lap.split_ms,
            format_time_display(lap.cumulative_ms),
            format_time_display(lap.split_ms),
            class
        ));
    }
    out
}
