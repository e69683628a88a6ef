//! Stopwatch lifecycle controller.
//!
//! Owns the `Stopwatch`, applies commands from presentation layers and emits
//! events back. The refresh ticker lives here too, so it only exists while the
//! stopwatch runs and is dropped in the same step that freezes the time.

use crate::model::{LapSheet, RunConfig, StopwatchEvent};
use crate::stopwatch::{Clock, Stopwatch};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{Interval, MissedTickBehavior};

/// Commands emitted by UI layers to drive the stopwatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UiCommand {
    Toggle,
    Start,
    Pause,
    Lap,
    Reset,
    Quit,
}

fn new_ticker(cfg: &RunConfig) -> Interval {
    let mut ticker = tokio::time::interval(cfg.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Apply one command. Returns the event describing the transition, if any.
fn apply_command<C: Clock>(sw: &mut Stopwatch<C>, cmd: UiCommand) -> Option<StopwatchEvent> {
    let was_running = sw.is_running();
    match cmd {
        UiCommand::Toggle => sw.toggle(),
        UiCommand::Start => sw.start(),
        UiCommand::Pause => sw.pause(),
        UiCommand::Reset => {
            sw.reset();
            return Some(StopwatchEvent::Reset);
        }
        UiCommand::Lap => {
            return Some(match sw.lap() {
                Some(lap) => StopwatchEvent::LapRecorded(lap),
                None => StopwatchEvent::LapIgnored,
            });
        }
        UiCommand::Quit => return None,
    }

    let elapsed_ms = sw.elapsed_ms();
    match (was_running, sw.is_running()) {
        (false, true) => Some(StopwatchEvent::Started { elapsed_ms }),
        (true, false) => Some(StopwatchEvent::Paused { elapsed_ms }),
        _ => None,
    }
}

/// Feedback for a start/pause that did not change anything.
fn redundant_notice(cmd: UiCommand) -> Option<StopwatchEvent> {
    let message = match cmd {
        UiCommand::Start => "Already running",
        UiCommand::Pause => "Already paused",
        _ => return None,
    };
    Some(StopwatchEvent::Info {
        message: message.to_string(),
    })
}

/// Drive the stopwatch from UI commands until `Quit` or the command channel
/// closes. Returns the final lap sheet for post-processing.
pub(crate) async fn run_controller<C: Clock>(
    cfg: &RunConfig,
    clock: C,
    event_tx: UnboundedSender<StopwatchEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<LapSheet> {
    let mut stopwatch = Stopwatch::new(clock);
    let mut ticker: Option<Interval> = None;

    if cfg.start_on_launch {
        stopwatch.start();
        ticker = Some(new_ticker(cfg));
        let _ = event_tx.send(StopwatchEvent::Started { elapsed_ms: 0 });
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let cmd = match cmd {
                    Some(UiCommand::Quit) | None => break,
                    Some(cmd) => cmd,
                };
                let event = apply_command(&mut stopwatch, cmd);
                tracing::debug!(?cmd, ?event, "applied command");

                // Keep the ticker in lockstep with the run state. Dropping it is the
                // cancellation; no tick can be produced after a pause or reset.
                match (stopwatch.is_running(), ticker.is_some()) {
                    (true, false) => ticker = Some(new_ticker(cfg)),
                    (false, true) => ticker = None,
                    _ => {}
                }

                let event = event.or_else(|| redundant_notice(cmd));
                if let Some(event) = event {
                    let _ = event_tx.send(event);
                }
            }
            _ = async {
                match ticker.as_mut() {
                    Some(t) => t.tick().await,
                    None => futures::future::pending().await,
                }
            } => {
                let _ = event_tx.send(StopwatchEvent::Tick {
                    elapsed_ms: stopwatch.elapsed_ms(),
                });
            }
        }
    }

    stopwatch.pause();
    tracing::info!(
        laps = stopwatch.lap_count(),
        elapsed_ms = stopwatch.elapsed_ms(),
        "controller stopped"
    );
    Ok(stopwatch.lap_sheet())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SplitClass;
    use crate::stopwatch::{ManualClock, MonotonicClock};
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn next_non_tick(rx: &mut UnboundedReceiver<StopwatchEvent>) -> StopwatchEvent {
        loop {
            match rx.recv().await {
                Some(StopwatchEvent::Tick { .. }) => continue,
                Some(ev) => return ev,
                None => panic!("event channel closed"),
            }
        }
    }

    #[test]
    fn test_apply_command_transitions() {
        let clock = ManualClock::default();
        let mut sw = Stopwatch::new(clock.clone());

        assert_eq!(
            apply_command(&mut sw, UiCommand::Lap),
            Some(StopwatchEvent::LapIgnored)
        );
        assert_eq!(
            apply_command(&mut sw, UiCommand::Toggle),
            Some(StopwatchEvent::Started { elapsed_ms: 0 })
        );
        clock.set(400);
        assert_eq!(apply_command(&mut sw, UiCommand::Start), None);
        match apply_command(&mut sw, UiCommand::Lap) {
            Some(StopwatchEvent::LapRecorded(lap)) => {
                assert_eq!(lap.index, 1);
                assert_eq!(lap.cumulative_ms, 400);
            }
            other => panic!("unexpected {other:?}"),
        }
        clock.set(650);
        assert_eq!(
            apply_command(&mut sw, UiCommand::Pause),
            Some(StopwatchEvent::Paused { elapsed_ms: 650 })
        );
        assert_eq!(apply_command(&mut sw, UiCommand::Pause), None);
        assert_eq!(
            redundant_notice(UiCommand::Pause),
            Some(StopwatchEvent::Info {
                message: "Already paused".into()
            })
        );
        assert_eq!(redundant_notice(UiCommand::Toggle), None);
        assert_eq!(
            apply_command(&mut sw, UiCommand::Reset),
            Some(StopwatchEvent::Reset)
        );
        assert_eq!(sw.elapsed_ms(), 0);
        assert_eq!(sw.lap_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_scenario() {
        let cfg = RunConfig::default();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let clock = MonotonicClock::new();
        let handle =
            tokio::spawn(async move { run_controller(&cfg, clock, event_tx, cmd_rx).await });

        cmd_tx.send(UiCommand::Toggle).unwrap();
        assert_eq!(
            next_non_tick(&mut event_rx).await,
            StopwatchEvent::Started { elapsed_ms: 0 }
        );

        tokio::time::advance(Duration::from_millis(1_000)).await;
        cmd_tx.send(UiCommand::Lap).unwrap();
        match next_non_tick(&mut event_rx).await {
            StopwatchEvent::LapRecorded(lap) => {
                assert_eq!((lap.index, lap.split_ms), (1, 1_000));
                assert_eq!(lap.classification, SplitClass::Regular);
            }
            other => panic!("unexpected {other:?}"),
        }

        tokio::time::advance(Duration::from_millis(800)).await;
        cmd_tx.send(UiCommand::Lap).unwrap();
        match next_non_tick(&mut event_rx).await {
            StopwatchEvent::LapRecorded(lap) => {
                assert_eq!((lap.index, lap.split_ms), (2, 800));
                assert_eq!(lap.classification, SplitClass::Best);
            }
            other => panic!("unexpected {other:?}"),
        }

        tokio::time::advance(Duration::from_millis(200)).await;
        cmd_tx.send(UiCommand::Toggle).unwrap();
        assert_eq!(
            next_non_tick(&mut event_rx).await,
            StopwatchEvent::Paused { elapsed_ms: 2_000 }
        );

        cmd_tx.send(UiCommand::Quit).unwrap();
        let sheet = handle.await.unwrap().unwrap();
        assert_eq!(sheet.total_ms, 2_000);
        assert_eq!(sheet.laps.len(), 2);

        // Sender dropped with the controller; nothing follows the pause.
        assert!(event_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_stop_after_pause_and_reset() {
        let cfg = RunConfig {
            start_on_launch: true,
            ..RunConfig::default()
        };
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let clock = MonotonicClock::new();
        let handle =
            tokio::spawn(async move { run_controller(&cfg, clock, event_tx, cmd_rx).await });

        assert_eq!(
            event_rx.recv().await,
            Some(StopwatchEvent::Started { elapsed_ms: 0 })
        );
        tokio::time::sleep(Duration::from_millis(55)).await;
        cmd_tx.send(UiCommand::Reset).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();

        let mut ticks = 0;
        let mut last_tick = 0;
        let mut after_reset = Vec::new();
        let mut seen_reset = false;
        while let Some(ev) = event_rx.recv().await {
            match ev {
                StopwatchEvent::Tick { elapsed_ms } if !seen_reset => {
                    assert!(elapsed_ms >= last_tick);
                    last_tick = elapsed_ms;
                    ticks += 1;
                }
                StopwatchEvent::Reset => seen_reset = true,
                other => after_reset.push(other),
            }
        }
        assert!(seen_reset);
        assert!(ticks >= 1);
        assert!(after_reset.is_empty(), "events after reset: {after_reset:?}");
    }
}
