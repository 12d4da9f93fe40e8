//! Reference host for settle-core
//!
//! Drives a [`settle_core::DebounceHolder`] from a line stream and writes
//! each settled value out.

pub mod host;
pub mod logging;

pub use host::{HostOptions, HostSummary};
