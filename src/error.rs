//! Error types for the buffer, its configuration and the simulation driver.

use std::fmt;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Which kind of slot a worker was waiting for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotKind {
    /// A free slot (producer side).
    Empty,
    /// An occupied slot (consumer side).
    Full,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Empty => f.write_str("empty"),
            SlotKind::Full => f.write_str("full"),
        }
    }
}

/// Failures of insert/remove.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The buffer was closed by shutdown before a slot permit was obtained.
    #[error("buffer closed while waiting on the {kind}-slots semaphore")]
    Closed { kind: SlotKind },
}

/// Invalid startup configuration. Fatal: the simulation never starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{argument} argument must be at least 0 (got {value})")]
    Negative { argument: &'static str, value: i64 },

    #[error("{argument} argument must be an integer (got {value:?})")]
    NotANumber { argument: &'static str, value: String },

    #[error("Last argument must be \"yes\" or \"no\" (got {0:?})")]
    InvalidSnapshotFlag(String),

    #[error("Buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error("Buffer capacity {0} exceeds the maximum of {max}", max = crate::MPMC::Buffer::MAX_CAPACITY)]
    CapacityTooLarge(usize),

    #[error("{role} count {count} exceeds the maximum of {max}", max = crate::config::MAX_WORKERS)]
    TooManyWorkers { role: &'static str, count: usize },
}

/// Errors surfaced by the simulation driver.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker thread {0} panicked")]
    WorkerPanicked(String),
}
