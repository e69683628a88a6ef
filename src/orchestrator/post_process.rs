//! End-of-session processing.
//!
//! Stamps the final lap sheet and writes the exports requested on the command line.

use crate::cli::Cli;
use crate::model::LapSheet;
use crate::storage;

/// Result of post-session processing, ready for presentation layers.
pub(crate) struct ProcessedSession {
    pub sheet: LapSheet,
    pub export_messages: Vec<String>,
}

/// Stamp the sheet with the current time and run the `--export-*` options.
/// Export failures are reported as messages, never as errors.
pub(crate) fn process_session_end(args: &Cli, mut sheet: LapSheet) -> ProcessedSession {
    sheet.exported_at_utc = storage::timestamp_utc();

    let mut export_messages = Vec::new();
    if let Some(export_path) = args.export_json.as_deref() {
        match storage::export_json(export_path, &sheet) {
            Ok(_) => export_messages.push(format!("Exported JSON: {}", export_path.display())),
            Err(e) => export_messages.push(format!("Export JSON failed: {e:#}")),
        }
    }
    if let Some(export_path) = args.export_csv.as_deref() {
        match storage::export_csv(export_path, &sheet) {
            Ok(_) => export_messages.push(format!("Exported CSV: {}", export_path.display())),
            Err(e) => export_messages.push(format!("Export CSV failed: {e:#}")),
        }
    }

    ProcessedSession {
        sheet,
        export_messages,
    }
}
