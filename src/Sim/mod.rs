//! The driver: spawns the workers, lets them run, shuts them down and
//! collects the summary.

mod report;
mod shutdown;

pub use report::SummaryReport;
pub use shutdown::ShutdownCoordinator;

use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::Core::Shutdown;
use crate::MPMC::Buffer::BoundedBuffer;
use crate::MPMC::{BufferBuilder, Consumer, Producer};

pub struct Simulation {
    config: SimConfig,
    buffer: Arc<BoundedBuffer>,
    coordinator: ShutdownCoordinator,
}

impl Simulation {
    /// Prepares a run that prints to stdout.
    pub fn new(config: SimConfig) -> Result<Self> {
        Self::from_builder(config, BufferBuilder::new())
    }

    /// Prepares a run that prints to `output`.
    pub fn with_output<W: Write + Send + 'static>(config: SimConfig, output: W) -> Result<Self> {
        Self::from_builder(config, BufferBuilder::new().with_output(output))
    }

    fn from_builder(config: SimConfig, builder: BufferBuilder) -> Result<Self> {
        config.validate()?;
        let buffer = builder
            .with_capacity(config.capacity)
            .with_snapshots(config.snapshots)
            .build()?;
        let buffer = Arc::new(buffer);
        let coordinator = ShutdownCoordinator::new(Shutdown::new(), Arc::clone(&buffer));
        Ok(Self {
            config,
            buffer,
            coordinator,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn buffer(&self) -> &Arc<BoundedBuffer> {
        &self.buffer
    }

    /// Handle that can end the run early, e.g. from a Ctrl+C handler.
    pub fn coordinator(&self) -> ShutdownCoordinator {
        self.coordinator.clone()
    }

    /// Runs the workers for the configured duration (or until the
    /// coordinator is triggered), joins them and returns the summary.
    pub fn run(self) -> Result<SummaryReport> {
        let config = &self.config;
        info!(
            producers = config.producers,
            consumers = config.consumers,
            capacity = config.capacity,
            run_duration = ?config.run_duration,
            max_sleep = ?config.max_sleep,
            "starting simulation"
        );

        let workers = match self.spawn_workers() {
            Ok(workers) => workers,
            Err(e) => {
                error!(error = %e, "failed to spawn worker");
                return Err(e);
            }
        };

        let completed = self.coordinator.wait(config.run_duration);
        self.coordinator.trigger();

        let mut panicked = None;
        for (name, handle) in workers {
            match handle.join() {
                Ok(count) => info!(worker = %name, count, "worker finished"),
                Err(_) => {
                    error!(worker = %name, "worker panicked");
                    panicked.get_or_insert(name);
                }
            }
        }
        if let Some(name) = panicked {
            return Err(SimError::WorkerPanicked(name));
        }

        let stats = self.buffer.report();
        info!(
            produced = stats.produced,
            consumed = stats.consumed,
            remaining = stats.remaining,
            "simulation complete"
        );
        Ok(SummaryReport {
            config: self.config,
            stats,
            interrupted: !completed,
        })
    }

    /// Spawns producers then consumers. On failure, workers already started
    /// are stopped and joined before the error is returned.
    fn spawn_workers(&self) -> Result<Vec<(String, JoinHandle<u64>)>> {
        let shutdown = self.coordinator.shutdown();
        let mut workers = Vec::new();

        let result = (|| -> Result<()> {
            for i in 1..=self.config.producers {
                let producer = Producer::new(
                    Arc::clone(&self.buffer),
                    shutdown.clone(),
                    self.config.max_sleep,
                );
                let name = format!("producer-{i}");
                let handle = thread::Builder::new()
                    .name(name.clone())
                    .spawn(move || producer.run())?;
                workers.push((name, handle));
            }
            for i in 1..=self.config.consumers {
                let consumer = Consumer::new(
                    Arc::clone(&self.buffer),
                    shutdown.clone(),
                    self.config.max_sleep,
                );
                let name = format!("consumer-{i}");
                let handle = thread::Builder::new()
                    .name(name.clone())
                    .spawn(move || consumer.run())?;
                workers.push((name, handle));
            }
            Ok(())
        })();

        if let Err(e) = result {
            self.coordinator.trigger();
            for (_, handle) in workers {
                let _ = handle.join();
            }
            return Err(e);
        }
        Ok(workers)
    }
}
