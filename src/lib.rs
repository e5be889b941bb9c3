// Module naming follows project convention (MPMC = Multi-Producer Multi-Consumer)
#[allow(non_snake_case)]
pub mod MPMC;
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
pub mod Debug;
#[allow(non_snake_case)]
pub mod Sim;

pub mod config;
pub mod error;

pub use config::SimConfig;
pub use error::{BufferError, ConfigError, Result, SimError, SlotKind};
pub use MPMC::Buffer::{BoundedBuffer, BufferItem, SlotStore, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use MPMC::Structs::{StatsReport, WorkerId};
pub use MPMC::{BufferBuilder, Consumer, Producer};
pub use Sim::{ShutdownCoordinator, Simulation, SummaryReport};
