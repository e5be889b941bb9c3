// src/MPMC/consumer.rs

use crate::error::BufferError;
use crate::Core::Shutdown;
use crate::MPMC::Buffer::layout::BufferItem;
use crate::MPMC::Buffer::BoundedBuffer;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A worker that keeps removing items until shutdown.
pub struct Consumer {
    buffer: Arc<BoundedBuffer>,
    shutdown: Shutdown,
    max_sleep: Duration,
}

impl Consumer {
    pub fn new(buffer: Arc<BoundedBuffer>, shutdown: Shutdown, max_sleep: Duration) -> Self {
        Self {
            buffer,
            shutdown,
            max_sleep,
        }
    }

    /// Removes one item, blocking while the buffer is empty.
    pub fn consume_one(&self) -> Result<BufferItem, BufferError> {
        self.buffer.remove()
    }

    /// Runs until shutdown. Returns the number of items removed.
    pub fn run(&self) -> u64 {
        let mut consumed = 0;
        while !self.shutdown.should_exit() {
            if !super::random_pause(&self.shutdown, self.max_sleep) {
                break;
            }
            match self.consume_one() {
                Ok(_) => consumed += 1,
                Err(e) => {
                    debug!(error = %e, "consumer stopping");
                    break;
                }
            }
        }
        consumed
    }
}
