//! Quiet-period durations

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Delay used when the caller does not pick one
pub const DEFAULT_DELAY_MS: u64 = 300;

/// Length of the quiet period a value must survive before it settles
///
/// Wraps a [`Duration`], so a negative delay cannot be represented once
/// constructed. Signed input goes through [`Delay::try_from_millis`].
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Delay(Duration);

impl Delay {
    /// Zero-length delay: settles on the next scheduler tick
    pub const ZERO: Delay = Delay(Duration::ZERO);

    /// Create a delay from whole milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    /// Create a delay from a signed millisecond count
    ///
    /// Negative values are rejected with [`Error::NegativeDelay`].
    pub fn try_from_millis(ms: i64) -> Result<Self> {
        u64::try_from(ms)
            .map(Self::from_millis)
            .map_err(|_| Error::NegativeDelay(ms))
    }

    /// The delay as a [`Duration`]
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// The delay in whole milliseconds
    pub fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }

    /// Whether this delay settles on the next tick
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::from_millis(DEFAULT_DELAY_MS)
    }
}

impl From<Duration> for Delay {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<Delay> for Duration {
    fn from(delay: Delay) -> Self {
        delay.0
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_300ms() {
        assert_eq!(Delay::default().as_duration(), Duration::from_millis(300));
    }

    #[test]
    fn test_negative_delay_rejected() {
        let err = Delay::try_from_millis(-1).unwrap_err();
        assert!(matches!(err, Error::NegativeDelay(-1)));
        assert!(err.to_string().contains("-1ms"));
    }

    #[test]
    fn test_zero_and_large_delays_accepted() -> Result<()> {
        assert!(Delay::try_from_millis(0)?.is_zero());
        let large = Delay::try_from_millis(i64::MAX)?;
        assert_eq!(large.as_millis(), i64::MAX as u128);
        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(Delay::from_millis(500).to_string(), "500ms");
    }
}
