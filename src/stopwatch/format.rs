#[cfg(feature = "tui")]
use crate::model::SplitClass;

/// Format milliseconds as "MM:SS:CC". Minutes are not wrapped at 60 and widen
/// past two digits when needed.
pub fn format_time_display(ms: u64) -> String {
    let total_secs = ms / 1000;
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    let centis = (ms % 1000) / 10;
    format!("{:02}:{:02}:{:02}", mins, secs, centis)
}

/// Format a split as "+MM:SS:CC".
pub fn format_split(ms: u64) -> String {
    format!("+{}", format_time_display(ms))
}

/// Marker shown next to a lap row.
#[cfg(feature = "tui")]
pub fn lap_indicator(index: u32, class: SplitClass) -> String {
    match class {
        SplitClass::Best => "⚡".to_string(),
        SplitClass::Worst => "🐌".to_string(),
        SplitClass::Regular => index.to_string(),
    }
}
