mod export;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::logging::LogBuffer;
use crate::model::{RunConfig, SplitClass, StopwatchEvent};
use crate::orchestrator::{self, UiCommand};
use crate::stopwatch::{format_split, format_time_display, lap_indicator, MonotonicClock};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline, Tabs},
    Terminal,
};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use export::{copy_exported_path, export_and_show_path, export_laps_csv, export_laps_json};
use help::{draw_help, shortcut_lines};
use state::{push_wrapped_status_kv, UiState};

pub async fn run(args: Cli, log_buffer: LogBuffer) -> Result<()> {
    let cfg = build_config(&args);
    // Unbounded channels avoid backpressure and task switching in the hot path.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<StopwatchEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_cfg = cfg.clone();
    let ui_handle =
        std::thread::spawn(move || run_threaded(ui_cfg, log_buffer, event_rx, cmd_tx));

    let res = orchestrator::run_controller(&cfg, MonotonicClock::new(), event_tx, cmd_rx).await;

    let joined = tokio::task::spawn_blocking(move || ui_handle.join())
        .await
        .context("join TUI thread")?;
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e),
        Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
    }

    let processed = orchestrator::process_session_end(&args, res?);
    for msg in processed.export_messages {
        eprintln!("{msg}");
    }
    Ok(())
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    cfg: RunConfig,
    log_buffer: LogBuffer,
    mut event_rx: UnboundedReceiver<StopwatchEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::default();

    // Redraw at the refresh rate, capped so slow terminals are not flooded.
    let redraw_rate = cfg.refresh_interval.max(Duration::from_millis(10));
    let mut last_draw: Option<Instant> = None;

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_draw.map_or(true, |t| t.elapsed() >= redraw_rate) {
            terminal
                .draw(|f| draw(f.area(), f, &state, &log_buffer))
                .ok();
            last_draw = Some(Instant::now());
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if !event::poll(Duration::from_millis(5)).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(k)) = event::read() else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        match (k.modifiers, k.code) {
            (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                let _ = cmd_tx.send(UiCommand::Quit);
                break Ok(());
            }
            (_, KeyCode::Char(' ')) => {
                let _ = cmd_tx.send(UiCommand::Toggle);
            }
            (_, KeyCode::Char('l')) | (_, KeyCode::Char('L')) => {
                // The controller rejects stopped laps too; gating here avoids the round trip.
                if state.can_lap() {
                    let _ = cmd_tx.send(UiCommand::Lap);
                } else {
                    state.info = "Start the stopwatch to record laps".into();
                }
            }
            (_, KeyCode::Char('r')) | (_, KeyCode::Char('R')) => {
                let _ = cmd_tx.send(UiCommand::Reset);
            }
            (_, KeyCode::Char('e')) => {
                export_and_show_path(&mut state, "JSON", export_laps_json);
            }
            (_, KeyCode::Char('c')) => {
                export_and_show_path(&mut state, "CSV", export_laps_csv);
            }
            (_, KeyCode::Char('y')) => copy_exported_path(&mut state),
            (_, KeyCode::Tab) => {
                state.tab = (state.tab + 1) % 3;
            }
            (_, KeyCode::Char('?')) => {
                state.tab = 2;
            }
            (_, KeyCode::Up) | (_, KeyCode::Char('k')) => state.scroll_up(),
            (_, KeyCode::Down) | (_, KeyCode::Char('j')) => state.scroll_down(),
            _ => {}
        }
        // Redraw right away so key feedback does not wait for the next frame.
        last_draw = None;
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, log_buffer: &LogBuffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Stopwatch"), Line::from("Log"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("lapwatch"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_stopwatch(chunks[1], f, state),
        1 => draw_log(chunks[1], f, log_buffer),
        _ => draw_help(chunks[1], f),
    }
}

fn draw_stopwatch(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5), // Time display
                Constraint::Min(0),    // Laps + stats/shortcuts
                Constraint::Length(4), // Status row
            ]
            .as_ref(),
        )
        .split(area);

    draw_time(main[0], f, state);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(main[1]);
    draw_laps(middle[0], f, state);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)].as_ref())
        .split(middle[1]);
    draw_split_stats(side[0], f, state);

    let shortcuts = Paragraph::new(shortcut_lines(state.status.toggle_label())).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Keyboard Shortcuts"),
    );
    f.render_widget(shortcuts, side[1]);

    let mut status_lines = vec![Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Gray)),
        Span::styled(state.status.label(), Style::default().fg(state.status.color())),
        Span::raw("   "),
        Span::styled("Laps: ", Style::default().fg(Color::Gray)),
        Span::raw(state.laps.count().to_string()),
    ])];
    push_wrapped_status_kv(&mut status_lines, "Info", &state.info, main[2].width);

    let status =
        Paragraph::new(status_lines).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, main[2]);
}

fn draw_time(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let color = state.status.color();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format_time_display(state.elapsed_ms),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::raw("Time ("),
                Span::styled(state.status.label(), Style::default().fg(color)),
                Span::raw(")"),
            ])),
    );
    f.render_widget(p, area);
}

fn class_style(class: SplitClass) -> Style {
    match class {
        SplitClass::Best => Style::default().fg(Color::Green),
        SplitClass::Worst => Style::default().fg(Color::Red),
        SplitClass::Regular => Style::default().fg(Color::Gray),
    }
}

fn draw_laps(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let title = format!("Laps [{}]", state.laps.count());
    if state.laps.count() == 0 {
        let p = Paragraph::new(vec![Line::from(Span::styled(
            "No laps recorded yet",
            Style::default().fg(Color::Gray),
        ))])
        .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(p, area);
        return;
    }

    // Borders take two rows.
    let max_items = (area.height as usize).saturating_sub(2).max(1);

    // Newest lap first. Markers use the current best/worst so earlier rows are
    // re-marked as later laps beat them.
    let lines: Vec<Line> = state
        .laps
        .laps()
        .iter()
        .rev()
        .skip(state.lap_scroll_offset)
        .take(max_items)
        .map(|lap| {
            let class = state.laps.classify(lap.index).unwrap_or(SplitClass::Regular);
            Line::from(vec![
                Span::styled(
                    format!("{:>3} ", lap_indicator(lap.index, class)),
                    class_style(class),
                ),
                Span::raw(format!("Lap {:<4}", lap.index)),
                Span::raw(format_time_display(lap.cumulative_ms)),
                Span::raw("   "),
                Span::styled(format_split(lap.split_ms), class_style(class)),
            ])
        })
        .collect();

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn draw_split_stats(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)].as_ref())
        .split(area);

    let fmt_opt = |v: Option<u64>| v.map(format_time_display).unwrap_or_else(|| "-".into());
    let splits: Vec<u64> = state.laps.comparable_splits().collect();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Fastest: ", Style::default().fg(Color::Gray)),
            Span::styled(fmt_opt(state.laps.best_split()), class_style(SplitClass::Best)),
        ]),
        Line::from(vec![
            Span::styled("Slowest: ", Style::default().fg(Color::Gray)),
            Span::styled(
                fmt_opt(state.laps.worst_split()),
                class_style(SplitClass::Worst),
            ),
        ]),
        Line::from(vec![
            Span::styled("Spread:  ", Style::default().fg(Color::Gray)),
            Span::raw(fmt_opt(crate::metrics::split_spread(&splits))),
        ]),
    ];
    match crate::metrics::compute_split_metrics(&splits) {
        Some((mean, median, _, _)) => {
            lines.push(Line::from(vec![
                Span::styled("avg: ", Style::default().fg(Color::Gray)),
                Span::raw(format_time_display(mean.round() as u64)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("med: ", Style::default().fg(Color::Gray)),
                Span::raw(format_time_display(median as u64)),
            ]));
        }
        None => lines.push(Line::from("Need two splits for averages")),
    }
    if let Some(last) = state.recorded.last() {
        lines.push(Line::from(vec![
            Span::styled("Last lap: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("#{} {}", last.index, last.classification.as_str()),
                class_style(last.classification),
            ),
        ]));
    }

    let stats = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Splits"));
    f.render_widget(stats, rows[0]);

    f.render_widget(
        Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title("Split history"))
            .data(&state.split_series)
            .style(Style::default().fg(Color::Cyan)),
        rows[1],
    );
}

fn draw_log(area: Rect, f: &mut ratatui::Frame, log_buffer: &LogBuffer) {
    let entries = log_buffer.read();
    let max_items = (area.height as usize).saturating_sub(2);
    let skip = entries.len().saturating_sub(max_items);
    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled(
            "No log output (raise verbosity with -v)",
            Style::default().fg(Color::Gray),
        ))]
    } else {
        entries.into_iter().skip(skip).map(Line::from).collect()
    };
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Log"));
    f.render_widget(p, area);
}
