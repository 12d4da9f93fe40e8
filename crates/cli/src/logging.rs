//! Tracing subscriber setup

use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

/// Pick the log level: `-v` raises to debug, `-vv` to trace
pub fn effective_level(configured: &str, verbose: u8) -> Result<Level> {
    match verbose {
        0 => configured
            .parse()
            .with_context(|| format!("Invalid log level: {}", configured)),
        1 => Ok(Level::DEBUG),
        _ => Ok(Level::TRACE),
    }
}

/// Install the global subscriber
///
/// Logs go to stderr so stdout carries only settled values. With a log
/// file they go there instead, through a non-blocking writer; keep the
/// returned guard alive until exit or buffered lines are lost.
pub fn init(level: Level, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let builder = tracing_subscriber::fmt().with_max_level(level);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;

            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            builder
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;
            Ok(Some(guard))
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_used_without_verbose() -> Result<()> {
        assert_eq!(effective_level("warn", 0)?, Level::WARN);
        assert_eq!(effective_level("info", 0)?, Level::INFO);
        Ok(())
    }

    #[test]
    fn test_verbose_overrides_config() -> Result<()> {
        assert_eq!(effective_level("error", 1)?, Level::DEBUG);
        assert_eq!(effective_level("error", 3)?, Level::TRACE);
        Ok(())
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(effective_level("loud", 0).is_err());
    }
}
