use crate::logging::LogBuffer;
use crate::model::{LapSheet, RunConfig, StopwatchEvent};
use crate::orchestrator::{self, UiCommand};
use crate::stopwatch::MonotonicClock;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "lapwatch",
    version,
    about = "Terminal stopwatch with lap splits and optional TUI"
)]
pub struct Cli {
    /// Read commands from stdin and print events as text (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Read commands from stdin and print events as JSON lines (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Display refresh interval while running
    #[arg(long, default_value = "10ms")]
    pub refresh: humantime::Duration,

    /// Start the stopwatch as soon as the app launches
    #[arg(long)]
    pub start_on_launch: bool,

    /// Export the lap sheet as JSON on exit
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,

    /// Export the lap sheet as CSV on exit
    #[arg(long)]
    pub export_csv: Option<std::path::PathBuf>,

    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.text || self.json
    }
}

pub async fn run(args: Cli, log_buffer: Option<LogBuffer>) -> Result<()> {
    if !args.is_headless() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, log_buffer.unwrap_or_default()).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            drop(log_buffer);
            return run_headless(args).await;
        }
    }

    run_headless(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    let refresh = Duration::from(args.refresh);
    RunConfig {
        // A zero period would make the ticker spin.
        refresh_interval: refresh.max(Duration::from_millis(1)),
        start_on_launch: args.start_on_launch,
    }
}

/// Parse one stdin command. Blank lines yield `Ok(None)`.
pub(crate) fn parse_command(line: &str) -> Result<Option<UiCommand>> {
    let cmd = match line.trim().to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "toggle" | "space" => UiCommand::Toggle,
        "start" | "resume" => UiCommand::Start,
        "pause" | "stop" => UiCommand::Pause,
        "lap" | "l" => UiCommand::Lap,
        "reset" | "r" => UiCommand::Reset,
        "quit" | "exit" | "q" => UiCommand::Quit,
        other => anyhow::bail!("unknown command: {other}"),
    };
    Ok(Some(cmd))
}

/// Forward commands to the controller until `quit` or EOF.
async fn read_commands<R: AsyncBufRead + Unpin>(
    input: R,
    cmd_tx: mpsc::UnboundedSender<UiCommand>,
    out_tx: mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        match parse_command(&line) {
            Ok(Some(cmd)) => {
                if cmd_tx.send(cmd).is_err() || cmd == UiCommand::Quit {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => {
                let _ = out_tx.send(OutputLine::Stderr(format!("{e}")));
            }
        }
    }
    let _ = cmd_tx.send(UiCommand::Quit);
    Ok(())
}

/// Render one event for headless output. Ticks are only shown in text mode.
fn render_event(ev: &StopwatchEvent, json: bool) -> Result<Option<String>> {
    if !json {
        return Ok(crate::text_summary::event_line(ev));
    }
    if matches!(ev, StopwatchEvent::Tick { .. }) {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(ev).context("serialize event")?))
}

/// Render the end-of-session output. In JSON mode this is a single
/// `summary` record so the stream stays one value per line.
fn render_summary(sheet: &LapSheet, json: bool) -> Result<Vec<String>> {
    if !json {
        return Ok(crate::text_summary::build_text_summary(sheet).lines);
    }
    let mut value = serde_json::to_value(sheet).context("serialize lap sheet")?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("event".into(), "summary".into());
    }
    Ok(vec![serde_json::to_string(&value).context("serialize summary")?])
}

async fn run_headless(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<StopwatchEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let controller = tokio::spawn(async move {
        orchestrator::run_controller(&cfg, MonotonicClock::new(), evt_tx, cmd_rx).await
    });

    let input_out = out_tx.clone();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = read_commands(stdin, cmd_tx, input_out).await {
            tracing::warn!("{e:#}");
        }
    });

    while let Some(ev) = evt_rx.recv().await {
        if let Some(line) = render_event(&ev, args.json)? {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    let sheet = controller
        .await
        .context("controller task failed")?
        .context("stopwatch session failed")?;

    let processed = orchestrator::process_session_end(&args, sheet);
    for msg in processed.export_messages {
        let _ = out_tx.send(OutputLine::Stderr(msg));
    }

    for line in render_summary(&processed.sheet, args.json)? {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stopwatch::{ManualClock, Stopwatch};

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  ").unwrap(), None);
        assert_eq!(parse_command("Toggle").unwrap(), Some(UiCommand::Toggle));
        assert_eq!(parse_command("LAP\n").unwrap(), Some(UiCommand::Lap));
        assert_eq!(parse_command("r").unwrap(), Some(UiCommand::Reset));
        assert_eq!(parse_command("resume").unwrap(), Some(UiCommand::Start));
        assert_eq!(parse_command("quit").unwrap(), Some(UiCommand::Quit));
        assert!(parse_command("split").is_err());
    }

    #[test]
    fn test_build_config() {
        let args = Cli::parse_from(["lapwatch", "--text", "--refresh", "50ms", "--start-on-launch"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.refresh_interval, Duration::from_millis(50));
        assert!(cfg.start_on_launch);
        assert!(args.is_headless());

        let args = Cli::parse_from(["lapwatch"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.refresh_interval, Duration::from_millis(10));
        assert!(!cfg.start_on_launch);
        assert!(!args.is_headless());
    }

    fn session_events() -> (Vec<StopwatchEvent>, LapSheet) {
        let clock = ManualClock::default();
        let mut sw = Stopwatch::new(clock.clone());
        let mut events = Vec::new();

        sw.start();
        events.push(StopwatchEvent::Started { elapsed_ms: 0 });
        clock.set(300);
        events.push(StopwatchEvent::Tick { elapsed_ms: 300 });
        events.push(StopwatchEvent::LapRecorded(sw.lap().unwrap()));
        clock.set(500);
        events.push(StopwatchEvent::LapRecorded(sw.lap().unwrap()));
        events.push(StopwatchEvent::LapIgnored);
        sw.pause();
        events.push(StopwatchEvent::Paused { elapsed_ms: 500 });
        events.push(StopwatchEvent::Info {
            message: "Already paused".into(),
        });
        (events, sw.lap_sheet())
    }

    #[test]
    fn test_json_output_is_one_value_per_line() {
        let (events, sheet) = session_events();
        let mut lines = Vec::new();
        for ev in &events {
            lines.extend(render_event(ev, true).unwrap());
        }
        lines.extend(render_summary(&sheet, true).unwrap());

        // Ticks are dropped, the summary adds one line.
        assert_eq!(lines.len(), events.len());
        let values: Vec<serde_json::Value> = lines
            .iter()
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("{l}: {e}")))
            .collect();
        for v in &values {
            assert!(v["event"].is_string(), "untagged line: {v}");
        }
        assert_eq!(values[1]["event"], "lap_recorded");
        assert_eq!(values[2]["split_ms"], 200);
        assert_eq!(values[2]["classification"], "best");

        let summary = values.last().unwrap();
        assert_eq!(summary["event"], "summary");
        assert_eq!(summary["total_ms"], 500);
        assert_eq!(summary["laps"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_text_output() {
        let (events, sheet) = session_events();
        assert_eq!(
            render_event(&StopwatchEvent::Tick { elapsed_ms: 300 }, false).unwrap(),
            None
        );
        let lines: Vec<String> = events
            .iter()
            .filter_map(|ev| render_event(ev, false).unwrap())
            .collect();
        assert!(lines.iter().any(|l| l.starts_with("Paused")));
        assert!(lines.contains(&"Already paused".to_string()));

        let summary = render_summary(&sheet, false).unwrap();
        assert!(summary.len() > 1);
        assert!(serde_json::from_str::<serde_json::Value>(&summary[0]).is_err());
    }

    #[tokio::test]
    async fn test_read_commands_forwards_until_quit() {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let input: &[u8] = b"toggle\n\nsplit\nLAP\nquit\nreset\n";

        read_commands(input, cmd_tx, out_tx).await.unwrap();

        let mut cmds = Vec::new();
        while let Some(cmd) = cmd_rx.recv().await {
            cmds.push(cmd);
        }
        assert_eq!(cmds, vec![UiCommand::Toggle, UiCommand::Lap, UiCommand::Quit]);
        match out_rx.recv().await {
            Some(OutputLine::Stderr(msg)) => assert_eq!(msg, "unknown command: split"),
            _ => panic!("expected an error line"),
        }
    }

    #[tokio::test]
    async fn test_read_commands_quits_at_eof() {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let input: &[u8] = b"start\n";

        read_commands(input, cmd_tx, out_tx).await.unwrap();

        assert_eq!(cmd_rx.recv().await, Some(UiCommand::Start));
        assert_eq!(cmd_rx.recv().await, Some(UiCommand::Quit));
        assert_eq!(cmd_rx.recv().await, None);
    }

    #[test]
    fn test_text_and_json_conflict() {
        assert!(Cli::try_parse_from(["lapwatch", "--text", "--json"]).is_err());
    }
}
