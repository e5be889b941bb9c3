use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::Core::Shutdown;
use crate::MPMC::Buffer::BoundedBuffer;

/// Ends a run: raises the shutdown signal and closes the buffer so workers
/// blocked on a semaphore wake up and exit.
///
/// Cheap to clone; one clone can live in a signal handler.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown: Shutdown,
    buffer: Arc<BoundedBuffer>,
}

impl ShutdownCoordinator {
    pub fn new(shutdown: Shutdown, buffer: Arc<BoundedBuffer>) -> Self {
        Self { shutdown, buffer }
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Waits out the run duration. Returns false if shutdown came first.
    pub fn wait(&self, run_duration: Duration) -> bool {
        self.shutdown.sleep(run_duration)
    }

    /// Stops every worker. Idempotent.
    pub fn trigger(&self) {
        if !self.shutdown.is_cancelled() {
            info!("shutting down workers");
        }
        self.shutdown.cancel();
        self.buffer.close();
    }

    /// [`trigger`](Self::trigger) on behalf of an external signal.
    pub fn interrupt(&self) {
        warn!("received interrupt, stopping simulation early");
        self.trigger();
    }

    pub fn is_triggered(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
