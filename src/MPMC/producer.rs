// In src/MPMC/producer.rs
use crate::error::BufferError;
use crate::Core::Shutdown;
use crate::MPMC::Buffer::layout::BufferItem;
use crate::MPMC::Buffer::BoundedBuffer;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Range producers draw their items from.
pub const ITEM_RANGE: Range<BufferItem> = 0..100;

/// A worker that keeps inserting random items until shutdown.
pub struct Producer {
    buffer: Arc<BoundedBuffer>,
    shutdown: Shutdown,
    max_sleep: Duration,
}

impl Producer {
    pub fn new(buffer: Arc<BoundedBuffer>, shutdown: Shutdown, max_sleep: Duration) -> Self {
        Self {
            buffer,
            shutdown,
            max_sleep,
        }
    }

    /// Generates one item and inserts it, blocking while the buffer is full.
    pub fn produce_one(&self) -> Result<BufferItem, BufferError> {
        let item = fastrand::i32(ITEM_RANGE);
        self.buffer.insert(item)?;
        Ok(item)
    }

    /// Runs until shutdown. Returns the number of items inserted.
    pub fn run(&self) -> u64 {
        let mut produced = 0;
        while !self.shutdown.should_exit() {
            if !super::random_pause(&self.shutdown, self.max_sleep) {
                break;
            }
            match self.produce_one() {
                Ok(_) => produced += 1,
                Err(e) => {
                    debug!(error = %e, "producer stopping");
                    break;
                }
            }
        }
        produced
    }
}
