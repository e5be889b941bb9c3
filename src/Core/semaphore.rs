// Counting semaphore over a single futex word.

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Release};

use super::futex::{futex_wait, futex_wake, futex_wake_all};

/// High bit of the state word. Once set, every acquisition fails.
const CLOSED: u32 = 1 << 31;

/// Largest permit count a semaphore can hold.
pub const MAX_PERMITS: u32 = CLOSED - 1;

/// Why a non-blocking acquisition failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TryAcquireError {
    /// No permit is available right now.
    NoPermits,
    /// The semaphore has been closed.
    Closed,
}

/// A counting semaphore in the style of POSIX `sem_t`.
///
/// ### State word
/// - The low 31 bits hold the number of available permits.
/// - The high bit marks the semaphore as closed.
///
/// Waiters sleep on the word with `futex_wait(state, 0)`, so the kernel
/// re-checks the value atomically: a `release` or `close` that lands between
/// the waiter's check and its sleep changes the word and the sleep returns
/// immediately. No wakeup is lost.
pub struct Semaphore {
    state: AtomicU32,
}

impl Semaphore {
    /// Creates a semaphore holding `permits` permits.
    ///
    /// Permits above [`MAX_PERMITS`] are clamped.
    pub const fn new(permits: u32) -> Self {
        let permits = if permits > MAX_PERMITS {
            MAX_PERMITS
        } else {
            permits
        };
        Self {
            state: AtomicU32::new(permits),
        }
    }

    /// Takes one permit without blocking.
    pub fn try_acquire(&self) -> Result<(), TryAcquireError> {
        let mut current = self.state.load(Acquire);
        loop {
            if current & CLOSED != 0 {
                return Err(TryAcquireError::Closed);
            }
            if current == 0 {
                return Err(TryAcquireError::NoPermits);
            }
            match self
                .state
                .compare_exchange_weak(current, current - 1, AcqRel, Acquire)
            {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    /// Takes one permit, sleeping until one is released.
    ///
    /// Returns `Err(Closed)` if the semaphore is closed before a permit
    /// could be taken, including while the caller is asleep.
    pub fn acquire(&self) -> Result<(), TryAcquireError> {
        loop {
            match self.try_acquire() {
                Err(TryAcquireError::NoPermits) => futex_wait(&self.state, 0),
                result => return result,
            }
        }
    }

    /// Returns one permit and wakes a single sleeper.
    pub fn release(&self) {
        self.state.fetch_add(1, Release);
        futex_wake(&self.state);
    }

    /// Closes the semaphore and wakes every sleeper.
    ///
    /// Closing is permanent. Permits still held keep being counted, but no
    /// further acquisition succeeds.
    pub fn close(&self) {
        self.state.fetch_or(CLOSED, AcqRel);
        futex_wake_all(&self.state);
    }

    pub fn is_closed(&self) -> bool {
        self.state.load(Acquire) & CLOSED != 0
    }

    /// Number of permits available at the instant of the call.
    pub fn available_permits(&self) -> u32 {
        self.state.load(Acquire) & !CLOSED
    }
}
