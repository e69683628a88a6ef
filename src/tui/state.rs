use crate::model::{LapRecorded, LapSheet, StopwatchEvent};
use crate::stopwatch::{build_lap_sheet, format_time_display, LapTracker};
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Running,
    Paused,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Ready => "Ready",
            Status::Running => "Running",
            Status::Paused => "Paused",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Status::Ready => Color::Gray,
            Status::Running => Color::Green,
            Status::Paused => Color::Yellow,
        }
    }

    /// Label for the start/pause control in its current state.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Status::Ready => "Start",
            Status::Running => "Pause",
            Status::Paused => "Resume",
        }
    }
}

pub struct UiState {
    pub tab: usize,
    pub status: Status,
    pub info: String,

    /// Last elapsed value pushed by the controller.
    pub elapsed_ms: u64,
    /// Mirror of the controller's lap history, rebuilt from lap events.
    pub laps: LapTracker,
    /// Lap events as emitted, with the classification frozen at record time.
    pub recorded: Vec<LapRecorded>,
    pub split_series: Vec<u64>,
    pub lap_scroll_offset: usize, // 0 = newest lap at the top

    pub last_exported_path: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            status: Status::Ready,
            info: String::new(),
            elapsed_ms: 0,
            laps: LapTracker::new(),
            recorded: Vec::new(),
            split_series: Vec::new(),
            lap_scroll_offset: 0,
            last_exported_path: None,
        }
    }
}

impl UiState {
    pub fn push_series(series: &mut Vec<u64>, v: u64) {
        const MAX: usize = 120;
        series.push(v);
        if series.len() > MAX {
            let _ = series.drain(0..(series.len() - MAX));
        }
    }

    pub fn can_lap(&self) -> bool {
        self.status == Status::Running
    }

    pub fn apply_event(&mut self, ev: StopwatchEvent) {
        match ev {
            StopwatchEvent::Started { elapsed_ms } => {
                self.status = Status::Running;
                self.elapsed_ms = elapsed_ms;
                self.info = "Running".into();
            }
            StopwatchEvent::Paused { elapsed_ms } => {
                self.status = Status::Paused;
                self.elapsed_ms = elapsed_ms;
                self.info = format!("Paused at {}", format_time_display(elapsed_ms));
            }
            StopwatchEvent::Reset => {
                self.status = Status::Ready;
                self.elapsed_ms = 0;
                self.laps.clear();
                self.recorded.clear();
                self.split_series.clear();
                self.lap_scroll_offset = 0;
                self.info = "Reset".into();
            }
            StopwatchEvent::Tick { elapsed_ms } => {
                // Only the running display is refreshed by ticks.
                if self.status == Status::Running {
                    self.elapsed_ms = elapsed_ms;
                }
            }
            StopwatchEvent::LapRecorded(lap) => {
                self.laps.record_lap(lap.cumulative_ms);
                self.recorded.push(lap);
                if lap.index > 1 {
                    UiState::push_series(&mut self.split_series, lap.split_ms);
                }
                self.elapsed_ms = self.elapsed_ms.max(lap.cumulative_ms);
                self.lap_scroll_offset = 0;
                self.info = format!("Lap {} recorded", lap.index);
            }
            StopwatchEvent::LapIgnored => {
                self.info = "Start the stopwatch to record laps".into();
            }
            StopwatchEvent::Info { message } => self.info = message,
        }
    }

    pub fn lap_sheet(&self) -> LapSheet {
        let mut sheet = build_lap_sheet(&self.laps, self.elapsed_ms);
        sheet.exported_at_utc = crate::storage::timestamp_utc();
        sheet
    }

    pub fn scroll_up(&mut self) {
        self.lap_scroll_offset = self.lap_scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.lap_scroll_offset + 1 < self.laps.count() {
            self.lap_scroll_offset += 1;
        }
    }
}

pub fn push_wrapped_status_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    status_area_width: u16,
) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    // Account for borders (2 chars on each side)
    let usable_width = status_area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    while !remaining.is_empty() {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let chars_to_take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(chars_to_take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
    }
}
