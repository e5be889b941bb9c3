use std::io::Write;

use super::snapshot::SnapshotPrinter;
use super::Buffer::layout::{DEFAULT_CAPACITY, MAX_CAPACITY};
use super::Buffer::BoundedBuffer;
use crate::error::ConfigError;

pub struct BufferBuilder {
    capacity: usize,
    snapshots: bool,
    output: Option<Box<dyn Write + Send>>,
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            snapshots: false,
            output: None, // stdout
        }
    }
}

impl BufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_snapshots(mut self, snapshots: bool) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Send notices, activity lines and snapshots to `output` instead of
    /// stdout.
    pub fn with_output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    pub fn build(self) -> Result<BoundedBuffer, ConfigError> {
        validate_capacity(self.capacity)?;
        let printer = match self.output {
            Some(output) => SnapshotPrinter::new(output),
            None => SnapshotPrinter::stdout(),
        };
        Ok(BoundedBuffer::new(self.capacity, self.snapshots, printer))
    }
}

pub(crate) fn validate_capacity(capacity: usize) -> Result<(), ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::ZeroCapacity);
    }
    if capacity > MAX_CAPACITY {
        return Err(ConfigError::CapacityTooLarge(capacity));
    }
    Ok(())
}
