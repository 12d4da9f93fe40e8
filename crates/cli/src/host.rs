//! Update-cycle host for a debounced input stream
//!
//! Each input line is a new value. The host runs one update cycle per line
//! and one per tick, printing the settled value whenever it changes. The
//! holder is established on the first line and torn down when input ends.
//!
//! Input is read as bytes; a line that is not valid UTF-8 is decoded
//! lossily (invalid sequences become U+FFFD) rather than ending the run.

use anyhow::{Context, Result};
use settle_core::{DebounceHolder, Delay, Phase, SettleConfig, TokioScheduler};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::runtime::Handle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Resolved host settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostOptions {
    /// Quiet period passed to every update cycle
    pub delay: Delay,
    /// Period of the idle update cycle
    pub tick: Duration,
    /// Wait for the last input to settle before teardown
    pub drain_on_eof: bool,
}

impl HostOptions {
    /// Build options from a validated config
    pub fn from_config(config: &SettleConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self {
            delay: config.delay()?,
            tick: Duration::from_millis(config.host.tick_ms),
            drain_on_eof: config.host.drain_on_eof,
        })
    }
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            delay: Delay::default(),
            tick: Duration::from_millis(50),
            drain_on_eof: true,
        }
    }
}

/// Counters reported when the host exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostSummary {
    /// Lines read
    pub inputs: usize,
    /// Settled values written
    pub emitted: usize,
}

/// Holder plus the inputs of the owning context
struct UpdateCycle {
    scheduler: TokioScheduler,
    delay: Delay,
    holder: Option<DebounceHolder<String, TokioScheduler>>,
    input: Option<String>,
    emitted: Option<String>,
}

impl UpdateCycle {
    fn new(scheduler: TokioScheduler, delay: Delay) -> Self {
        Self {
            scheduler,
            delay,
            holder: None,
            input: None,
            emitted: None,
        }
    }

    /// Record a new input value
    fn set_input(&mut self, value: String) {
        self.input = Some(value);
    }

    /// Run the holder once; return the settled value if it changed
    fn run(&mut self) -> Option<String> {
        let input = self.input.clone()?;

        let settled = match self.holder.as_mut() {
            Some(holder) => holder.observe(input, self.delay),
            None => {
                debug!("Establishing debounce holder (delay {})", self.delay);
                let holder = DebounceHolder::new(self.scheduler.clone(), input, self.delay);
                let settled = holder.settled();
                self.holder = Some(holder);
                settled
            }
        };

        if self.emitted.as_ref() == Some(&settled) {
            return None;
        }
        self.emitted = Some(settled.clone());
        Some(settled)
    }

    fn is_settled(&self) -> bool {
        self.holder
            .as_ref()
            .map_or(true, |holder| holder.phase() == Phase::Settled)
    }

    /// Drop the holder, cancelling any armed timer
    fn teardown(&mut self) {
        if self.holder.take().is_some() {
            debug!("Debounce holder released");
        }
    }
}

async fn emit<W>(output: &mut W, value: &str, summary: &mut HostSummary) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output
        .write_all(format!("{}\n", value).as_bytes())
        .await
        .context("Failed to write settled value")?;
    output.flush().await.context("Failed to flush output")?;
    summary.emitted += 1;
    Ok(())
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Drive update cycles from `input` until it ends
///
/// Must be called inside a tokio runtime; timers run on it.
pub async fn run<R, W>(mut input: R, mut output: W, options: HostOptions) -> Result<HostSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let scheduler = TokioScheduler::new(Handle::current());
    let mut cycle = UpdateCycle::new(scheduler, options.delay);
    let mut summary = HostSummary::default();

    // Survives across select! iterations: read_until appends partial reads
    let mut buf = Vec::new();
    let mut ticker = interval(options.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Host started (delay {}, tick {:?}, drain on EOF: {})",
        options.delay, options.tick, options.drain_on_eof
    );

    loop {
        tokio::select! {
            read = input.read_until(b'\n', &mut buf) => {
                if read.context("Failed to read input")? == 0 {
                    break;
                }
                summary.inputs += 1;
                cycle.set_input(decode_line(&buf));
                buf.clear();
            }
            _ = ticker.tick() => {}
        }

        if let Some(settled) = cycle.run() {
            emit(&mut output, &settled, &mut summary).await?;
        }
    }

    if options.drain_on_eof {
        debug!("Input closed; waiting for last value to settle");
        while !cycle.is_settled() {
            ticker.tick().await;
            if let Some(settled) = cycle.run() {
                emit(&mut output, &settled, &mut summary).await?;
            }
        }
        if let Some(settled) = cycle.run() {
            emit(&mut output, &settled, &mut summary).await?;
        }
    }

    cycle.teardown();
    info!(
        "Host finished: {} inputs, {} settled values",
        summary.inputs, summary.emitted
    );
    Ok(summary)
}
