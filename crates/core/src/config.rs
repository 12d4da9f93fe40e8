//! Configuration file support
//!
//! Config lives at `<config_dir>/settle/config.toml` unless a path is given.
//! Every section is optional; missing keys fall back to defaults.

use crate::delay::{Delay, DEFAULT_DELAY_MS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub debounce: DebounceSection,
    pub host: HostSection,
    pub log: LogSection,
}

/// `[debounce]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceSection {
    /// Quiet period in milliseconds (signed so bad input can be reported)
    pub delay_ms: i64,
}

/// `[host]` section: how the reference host drives its update cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSection {
    /// Update-cycle period in milliseconds
    pub tick_ms: u64,
    /// Wait for the last input to settle before tearing down on EOF
    pub drain_on_eof: bool,
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for DebounceSection {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS as i64,
        }
    }
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            drain_on_eof: true,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Accepted `log.level` values
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl SettleConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: SettleConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the config as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The configured quiet period
    pub fn delay(&self) -> Result<Delay> {
        Delay::try_from_millis(self.debounce.delay_ms)
    }

    /// Check every value is in range
    ///
    /// Valid ranges:
    /// - `debounce.delay_ms`: >= 0 (no upper bound)
    /// - `host.tick_ms`: 1-60000
    /// - `log.level`: trace|debug|info|warn|error
    pub fn validate(&self) -> Result<()> {
        self.delay()?;

        if !(1..=60_000).contains(&self.host.tick_ms) {
            return Err(Error::InvalidConfig(format!(
                "host.tick_ms must be between 1 and 60000, got {}",
                self.host.tick_ms
            )));
        }

        if !LOG_LEVELS.contains(&self.log.level.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "log.level must be one of {}, got '{}'",
                LOG_LEVELS.join("|"),
                self.log.level
            )));
        }

        Ok(())
    }
}

/// Default config file location, if the platform has a config dir
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("settle").join("config.toml"))
}

/// Load and validate a config file
pub fn load(path: &Path) -> Result<SettleConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    SettleConfig::from_toml(&text)
}

/// Load `path` if given, else the default location if it exists, else defaults
///
/// An explicitly given path must exist.
pub fn load_or_default(path: Option<&Path>) -> Result<SettleConfig> {
    if let Some(path) = path {
        return load(path);
    }

    match config_file_path() {
        Some(default_path) if default_path.exists() => load(&default_path),
        _ => Ok(SettleConfig::default()),
    }
}

/// Validate and write a config file, creating parent directories
pub fn save(config: &SettleConfig, path: &Path) -> Result<()> {
    config.validate()?;
    let text = config.to_toml()?;

    let io_err = |source| Error::ConfigIo {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, text).map_err(io_err)
}

/// Commented example config with every key at its default
pub fn example_config() -> String {
    let defaults = SettleConfig::default();
    format!(
        r#"# settle configuration

[debounce]
# Quiet period in milliseconds before a value settles (>= 0)
delay_ms = {}

[host]
# Update-cycle period in milliseconds (1-60000)
tick_ms = {}
# Wait for the last input to settle before exiting on EOF
drain_on_eof = {}

[log]
# trace | debug | info | warn | error
level = "{}"
"#,
        defaults.debounce.delay_ms,
        defaults.host.tick_ms,
        defaults.host.drain_on_eof,
        defaults.log.level
    )
}
