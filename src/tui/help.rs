use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(format!("{:pad$}{what}", "")),
    ])
}

/// Shortcut lines shared by the help tab and the dashboard panel.
pub fn shortcut_lines(toggle_label: &'static str) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::raw("  "),
            Span::styled("space", Style::default().fg(Color::Magenta)),
            Span::raw("   "),
            Span::raw(toggle_label),
        ]),
        key_line("l", 7, "Lap"),
        key_line("r", 7, "Reset"),
        key_line("e", 7, "Export laps as JSON"),
        key_line("c", 7, "Export laps as CSV"),
        key_line("q", 7, "Quit"),
    ]
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let mut lines = vec![Line::from("Keybinds:")];
    lines.extend([
        key_line("space", 7, "Start / Pause / Resume"),
        key_line("l", 11, "Record a lap (while running)"),
        key_line("r", 11, "Reset time and laps"),
        key_line("↑/↓", 9, "Scroll laps"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("j/k", Style::default().fg(Color::Magenta)),
            Span::raw("         Scroll laps"),
        ]),
        key_line("e", 11, "Export laps as JSON"),
        key_line("c", 11, "Export laps as CSV"),
        key_line("y", 11, "Copy exported path to clipboard"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        Line::from(""),
        Line::from("Lap markers:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("⚡", Style::default().fg(Color::Green)),
            Span::raw("  Fastest split so far (lap 1 is never compared)"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("🐌", Style::default().fg(Color::Red)),
            Span::raw("  Slowest split, once there are two to compare"),
        ]),
    ]);

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
