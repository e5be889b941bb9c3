//! Shutdown signalling with deferred cancellation.
//!
//! A [`Shutdown`] is shared by every worker. Workers poll
//! [`Shutdown::should_exit`] between operations; a thread that is inside a
//! [`DeferCancel`] scope never observes a pending shutdown until the scope
//! ends, so it cannot abandon a half-finished mutation.

use parking_lot::{Condvar, Mutex};
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

thread_local! {
    static DEFER_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Returns true while the calling thread is inside a [`DeferCancel`] scope.
pub fn cancellation_deferred() -> bool {
    DEFER_DEPTH.with(|depth| depth.get() > 0)
}

/// Masks shutdown for the calling thread until dropped.
///
/// Scopes nest. The guard is tied to the thread that created it.
pub struct DeferCancel {
    _not_send: PhantomData<*const ()>,
}

impl DeferCancel {
    pub fn new() -> Self {
        DEFER_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Default for DeferCancel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferCancel {
    fn drop(&mut self) {
        DEFER_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

struct ShutdownInner {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    wakeup: Condvar,
}

/// Cloneable shutdown signal.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<ShutdownInner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ShutdownInner {
                cancelled: AtomicBool::new(false),
                lock: Mutex::new(()),
                wakeup: Condvar::new(),
            }),
        }
    }

    /// Requests termination and wakes every thread in [`Shutdown::sleep`].
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let _guard = self.inner.lock.lock();
        self.inner.wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// True once shutdown was requested, unless cancellation is deferred on
    /// the calling thread.
    pub fn should_exit(&self) -> bool {
        self.is_cancelled() && !cancellation_deferred()
    }

    /// Sleeps for `duration` or until shutdown, whichever comes first.
    ///
    /// Returns true if the full duration elapsed without a shutdown. A
    /// duration too long to express as an `Instant` waits for shutdown only.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let mut guard = self.inner.lock.lock();
        while !self.is_cancelled() {
            match deadline {
                Some(deadline) => {
                    if self
                        .inner
                        .wakeup
                        .wait_until(&mut guard, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                None => self.inner.wakeup.wait(&mut guard),
            }
        }
        !self.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
