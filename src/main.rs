mod cli;
mod logging;
mod metrics;
mod model;
mod orchestrator;
mod stopwatch;
mod storage;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_headless = args.is_headless() || cfg!(not(feature = "tui"));
    let log_buffer = logging::init(args.verbose, is_headless)?;

    tracing::debug!(?args, "starting lapwatch");

    match cli::run(args, log_buffer).await {
        Ok(()) => {
            // stdin reader may still be parked on a blocking read; don't wait for it.
            if is_headless {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            if is_headless {
                tracing::error!("{e:#}");
                std::process::exit(1);
            }
            Err(e)
        }
    }
}
