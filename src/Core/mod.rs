pub mod cancel;
pub mod futex;
pub mod semaphore;

pub use cancel::{cancellation_deferred, DeferCancel, Shutdown};
pub use semaphore::{Semaphore, TryAcquireError, MAX_PERMITS};
