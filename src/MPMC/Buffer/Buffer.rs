// This is the shared bounded buffer for producer/consumer workers

use super::layout::SlotStore;
use crate::Core::{DeferCancel, Semaphore};
use crate::MPMC::snapshot::SnapshotPrinter;
use crate::MPMC::Structs::Stats_Structs::Statistics;

use crossbeam_utils::CachePadded;
use parking_lot::{Mutex, MutexGuard};
use std::ops::{Deref, DerefMut};

/// Everything the buffer mutex protects.
pub(crate) struct BufferState {
    pub(crate) slots: SlotStore,
    pub(crate) stats: Statistics,
}

/// A bounded, blocking, multi-producer multi-consumer buffer.
///
/// Constructed once (see [`BufferBuilder`]) and shared by reference or
/// `Arc` with every worker for the whole run.
///
/// ### Concurrency Design:
/// - **Semaphores**: `empty_slots` starts at `capacity` permits and
///   `full_slots` at 0. A producer takes an `empty_slots` permit before
///   writing and returns a `full_slots` permit after; a consumer does the
///   reverse. Those two waits are the only places a worker blocks.
/// - **Mutex**: the slot store, its cursors and the statistics are touched
///   only while `state` is locked. The lock is held through a
///   [`CriticalSection`], which also defers cancellation for its lifetime.
/// - **Output**: the [`SnapshotPrinter`] has its own lock, since waiting
///   notices are printed outside the buffer mutex.
///
/// [`BufferBuilder`]: crate::MPMC::BufferBuilder
pub struct BoundedBuffer {
    /// Slot store and statistics.
    pub(crate) state: Mutex<BufferState>,

    /// Free-slot permits. Padded to keep the two futex words on separate
    /// cache lines.
    pub(crate) empty_slots: CachePadded<Semaphore>,

    /// Occupied-slot permits.
    pub(crate) full_slots: CachePadded<Semaphore>,

    /// Serialized output for notices, activity lines and snapshots.
    pub(crate) printer: SnapshotPrinter,

    /// Whether every insert/remove prints a snapshot.
    pub(crate) snapshots: bool,

    /// Number of slots. Fixed for the buffer's lifetime.
    pub(crate) capacity: usize,
}

/// The locked region of an insert or remove.
///
/// Fields drop in declaration order: the mutex is released first, then
/// cancellation is re-enabled for the thread.
///
/// The deferral only masks [`Shutdown::should_exit`] for code running in
/// the section. Workers never stop mid-operation because they poll shutdown
/// at the top of their loop and can only be aborted in the semaphore wait,
/// before the section is entered.
///
/// [`Shutdown::should_exit`]: crate::Core::Shutdown::should_exit
pub(crate) struct CriticalSection<'a> {
    guard: MutexGuard<'a, BufferState>,
    _defer: DeferCancel,
}

impl<'a> CriticalSection<'a> {
    pub(crate) fn enter(state: &'a Mutex<BufferState>) -> Self {
        let guard = state.lock();
        Self {
            guard,
            _defer: DeferCancel::new(),
        }
    }
}

impl Deref for CriticalSection<'_> {
    type Target = BufferState;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for CriticalSection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}
