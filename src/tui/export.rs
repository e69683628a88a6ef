use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use super::state::UiState;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Export the current lap sheet as JSON into the current directory.
/// Returns the absolute path of the exported file.
pub fn export_laps_json(state: &UiState) -> Result<PathBuf> {
    let sheet = state.lap_sheet();
    let path = crate::storage::default_export_path(&sheet, "json")?;
    crate::storage::export_json(&path, &sheet)?;
    Ok(path)
}

/// Export the current lap sheet as CSV into the current directory.
/// Returns the absolute path of the exported file.
pub fn export_laps_csv(state: &UiState) -> Result<PathBuf> {
    let sheet = state.lap_sheet();
    let path = crate::storage::default_export_path(&sheet, "csv")?;
    crate::storage::export_csv(&path, &sheet)?;
    Ok(path)
}

/// Run an export and report the outcome in the status line.
pub fn export_and_show_path(
    state: &mut UiState,
    kind: &str,
    export: fn(&UiState) -> Result<PathBuf>,
) {
    if state.laps.count() == 0 {
        state.info = "No laps to export yet.".into();
        return;
    }
    match export(state) {
        Ok(p) => {
            state.last_exported_path = Some(p.to_string_lossy().to_string());
            state.info = format!("Exported {kind}: {} (press 'y' to copy path)", p.display());
        }
        Err(e) => {
            state.info = format!("{kind} export failed: {e:#}");
        }
    }
}

/// Initialize the clipboard manager thread if not already initialized.
/// Clipboard instances are kept alive for a while so clipboard managers on Linux
/// can read the contents.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    } else {
                        tracing::warn!("clipboard rejected text");
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .context("Failed to initialize clipboard manager")
}

/// Copy text to clipboard without blocking the UI thread.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}

/// Copy the last exported path and report it in the status line.
pub fn copy_exported_path(state: &mut UiState) {
    let Some(path) = state.last_exported_path.clone() else {
        state.info = "No exported file path to copy. Export a file first (e/c)".into();
        return;
    };
    match copy_to_clipboard(&path) {
        Ok(_) => {
            let display_path = if path.chars().count() > 60 {
                let head: String = path.chars().take(57).collect();
                format!("{head}...")
            } else {
                path
            };
            state.info = format!("✓ Copied to clipboard: {}", display_path);
        }
        Err(e) => {
            state.info = format!("Clipboard copy failed: {e:#}");
        }
    }
}
