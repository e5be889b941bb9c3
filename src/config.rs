//! Startup configuration for a simulation run.

use std::time::Duration;

use crate::error::ConfigError;
use crate::MPMC::validate_capacity;
use crate::MPMC::Buffer::DEFAULT_CAPACITY;

/// Ordinal names of the positional arguments, used in error messages.
const ARGUMENT_NAMES: [&str; 5] = ["First", "Second", "Third", "Fourth", "Last"];

/// Most producer (or consumer) threads a run may spawn.
pub const MAX_WORKERS: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// How long the main thread lets the workers run.
    pub run_duration: Duration,
    /// Upper bound of each worker's random pause. Zero disables pausing.
    pub max_sleep: Duration,
    pub producers: usize,
    pub consumers: usize,
    /// Print a buffer snapshot after every insert/remove.
    pub snapshots: bool,
    pub capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            run_duration: Duration::from_secs(5),
            max_sleep: Duration::from_secs(1),
            producers: 1,
            consumers: 1,
            snapshots: false,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl SimConfig {
    /// Builds a configuration from the five positional arguments
    /// `<sim-time> <max-sleep> <producers> <consumers> <yes|no>`, times in
    /// whole seconds. Capacity is left at its default.
    pub fn from_positional(args: [&str; 5]) -> Result<Self, ConfigError> {
        let run_secs = parse_non_negative(ARGUMENT_NAMES[0], args[0])?;
        let sleep_secs = parse_non_negative(ARGUMENT_NAMES[1], args[1])?;
        let producers = parse_non_negative(ARGUMENT_NAMES[2], args[2])?;
        let consumers = parse_non_negative(ARGUMENT_NAMES[3], args[3])?;
        let snapshots = parse_snapshot_flag(args[4])?;

        Ok(Self {
            run_duration: Duration::from_secs(run_secs),
            max_sleep: Duration::from_secs(sleep_secs),
            producers: usize::try_from(producers).unwrap_or(usize::MAX),
            consumers: usize::try_from(consumers).unwrap_or(usize::MAX),
            snapshots,
            capacity: DEFAULT_CAPACITY,
        })
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (role, count) in [("Producer", self.producers), ("Consumer", self.consumers)] {
            if count > MAX_WORKERS {
                return Err(ConfigError::TooManyWorkers { role, count });
            }
        }
        validate_capacity(self.capacity)
    }
}

/// Parses an integer argument that must be at least 0.
pub fn parse_non_negative(argument: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let value: i64 = raw.trim().parse().map_err(|_| ConfigError::NotANumber {
        argument,
        value: raw.to_string(),
    })?;
    if value < 0 {
        return Err(ConfigError::Negative { argument, value });
    }
    Ok(value as u64)
}

/// Accepts `yes` or `no` in any letter case.
pub fn parse_snapshot_flag(raw: &str) -> Result<bool, ConfigError> {
    if raw.eq_ignore_ascii_case("yes") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("no") {
        Ok(false)
    } else {
        Err(ConfigError::InvalidSnapshotFlag(raw.to_string()))
    }
}
