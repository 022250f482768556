use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("day count must be a whole number, got `{0}`")]
    InvalidDayCount(String),
    #[error("seed must be an unsigned integer, got `{0}`")]
    InvalidSeed(String),
}

/// Number of days shown in the dashboard window, always within `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayCount(i64);

impl DayCount {
    pub const MIN: i64 = 7;
    pub const MAX: i64 = 90;
    pub const DEFAULT: i64 = 30;

    /// Clamps out-of-range requests into the window.
    pub fn new(days: i64) -> Self {
        let clamped = days.clamp(Self::MIN, Self::MAX);
        if clamped != days {
            tracing::warn!(requested = days, used = clamped, "day count out of range");
        }
        Self(clamped)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = Self::DEFAULT;
    }
}

impl Default for DayCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.0)
    }
}

impl FromStr for DayCount {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<i64>()
            .map(DayCount::new)
            .map_err(|_| ConfigError::InvalidDayCount(value.to_string()))
    }
}

pub fn parse_seed(value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidSeed(value.to_string()))
}

/// Logs go to stderr so command output can be piped. `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_count_clamps_into_window() {
        assert_eq!(DayCount::new(3).get(), 7);
        assert_eq!(DayCount::new(45).get(), 45);
        assert_eq!(DayCount::new(365).get(), 90);
        assert_eq!(DayCount::default().get(), 30);
    }

    #[test]
    fn reset_restores_default() {
        let mut days = DayCount::new(60);
        days.reset();
        assert_eq!(days, DayCount::default());
    }

    #[test]
    fn parses_from_text() {
        assert_eq!("14".parse::<DayCount>().unwrap().get(), 14);
        assert_eq!(" 120 ".parse::<DayCount>().unwrap().get(), 90);
        assert_eq!(
            "two weeks".parse::<DayCount>(),
            Err(ConfigError::InvalidDayCount("two weeks".to_string()))
        );
    }

    #[test]
    fn parses_seed() {
        assert_eq!(parse_seed("42"), Ok(42));
        assert!(matches!(parse_seed("-1"), Err(ConfigError::InvalidSeed(_))));
    }
}
