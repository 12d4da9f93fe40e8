//! Run the host over stdin

use crate::{LogArgs, RunArgs};
use anyhow::{Context, Result};
use settle_cli::host::{self, HostOptions};
use settle_core::config;
use tokio::io::BufReader;
use tracing::info;

pub async fn run(args: RunArgs, log: LogArgs) -> Result<()> {
    // 1. Load config file, then apply flag overrides
    let mut config = config::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(delay_ms) = args.delay_ms {
        config.debounce.delay_ms = delay_ms;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.host.tick_ms = tick_ms;
    }
    if args.no_drain {
        config.host.drain_on_eof = false;
    }

    let options = HostOptions::from_config(&config)?;

    // 2. Logging (guard must outlive the host)
    let level = settle_cli::logging::effective_level(&config.log.level, log.verbose)?;
    let _guard = settle_cli::logging::init(level, log.log_file.as_deref())?;

    // 3. Drive update cycles until stdin closes or Ctrl-C
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    tokio::select! {
        summary = host::run(input, output, options) => {
            summary?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted; pending timer cancelled");
        }
    }

    Ok(())
}
