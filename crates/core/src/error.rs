//! Error types for settle-core

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the configuration boundary
///
/// The debounce holder itself never fails; everything here comes from
/// turning untyped input (signed integers, TOML files) into typed values.
#[derive(Debug, Error)]
pub enum Error {
    /// A delay below zero was supplied
    #[error("Invalid delay: {0}ms (delay must be >= 0)")]
    NegativeDelay(i64),

    /// Config file could not be read or written
    #[error("Failed to access config file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::SettleConfig`]
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config parsed but holds an out-of-range value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for settle-core operations
pub type Result<T> = std::result::Result<T, Error>;
