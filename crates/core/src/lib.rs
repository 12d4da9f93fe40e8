//! Debounced state for settle
//!
//! This crate provides:
//! - [`DebounceHolder`]: holds the last value that stayed unchanged for a
//!   full quiet period
//! - [`Delay`]: quiet-period durations (default 300ms)
//! - [`Scheduler`] seam with a virtual clock ([`ManualClock`]) and a tokio
//!   timer backend ([`TokioScheduler`])
//! - TOML configuration ([`SettleConfig`])

pub mod config;
pub mod delay;
pub mod error;
pub mod holder;
pub mod manual;
pub mod runtime;
pub mod scheduler;

// Re-exports
pub use config::SettleConfig;
pub use delay::{Delay, DEFAULT_DELAY_MS};
pub use error::{Error, Result};
pub use holder::{DebounceHolder, Phase};
pub use manual::{ManualClock, TimerId};
pub use runtime::{TokioScheduler, TokioTimer};
pub use scheduler::{Callback, Scheduler};
