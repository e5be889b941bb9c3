use tracing::debug;

use super::layout::{BufferItem, SlotStore};
use super::Buffer::{BoundedBuffer, BufferState, CriticalSection};
use crate::error::{BufferError, SlotKind};
use crate::Core::{Semaphore, TryAcquireError};
use crate::MPMC::snapshot::SnapshotPrinter;
use crate::MPMC::Structs::Stats_Structs::{Statistics, StatsReport, WorkerId};

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;

impl BoundedBuffer {
    /// Create a buffer with every slot empty and all counters at zero.
    ///
    /// `capacity` must already be validated (non-zero, within the
    /// semaphore's permit range); [`BufferBuilder`] does that.
    ///
    /// [`BufferBuilder`]: crate::MPMC::BufferBuilder
    pub(crate) fn new(capacity: usize, snapshots: bool, printer: SnapshotPrinter) -> Self {
        let buffer = Self {
            state: Mutex::new(BufferState {
                slots: SlotStore::new(capacity),
                stats: Statistics::new(),
            }),
            empty_slots: CachePadded::new(Semaphore::new(capacity as u32)),
            full_slots: CachePadded::new(Semaphore::new(0)),
            printer,
            snapshots,
            capacity,
        };
        if snapshots {
            let state = buffer.state.lock();
            buffer.printer.snapshot(&state.slots, None);
        }
        buffer
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn snapshots_enabled(&self) -> bool {
        self.snapshots
    }

    /// Insert `item` on behalf of the calling thread.
    pub fn insert(&self, item: BufferItem) -> Result<(), BufferError> {
        self.insert_as(WorkerId::current(), item)
    }

    /// Insert `item`, blocking while the buffer is full.
    ///
    /// If no free slot is available immediately, a waiting notice is printed
    /// once and the caller sleeps until a consumer frees a slot. Fails only
    /// if the buffer is closed before a slot is obtained; nothing is written
    /// in that case.
    pub fn insert_as(&self, worker: WorkerId, item: BufferItem) -> Result<(), BufferError> {
        self.acquire_permit(SlotKind::Empty, worker)?;
        {
            let mut section = CriticalSection::enter(&self.state);
            let state = &mut *section;

            let Some(index) = state.slots.write(item) else {
                unreachable!("empty-slots permit held while every slot is occupied");
            };
            self.printer
                .line(format_args!("Producer {worker}: writes {item}"));
            state.stats.record_produced(worker, state.slots.is_full());
            debug!(%worker, item, index, occupied = state.slots.len(), "producer wrote item");

            if self.snapshots {
                self.printer.snapshot(&state.slots, Some(item));
            }
        }
        self.full_slots.release();
        Ok(())
    }

    /// Remove the oldest item on behalf of the calling thread.
    pub fn remove(&self) -> Result<BufferItem, BufferError> {
        self.remove_as(WorkerId::current())
    }

    /// Remove the oldest item, blocking while the buffer is empty.
    ///
    /// Mirror image of [`insert_as`](Self::insert_as).
    pub fn remove_as(&self, worker: WorkerId) -> Result<BufferItem, BufferError> {
        self.acquire_permit(SlotKind::Full, worker)?;
        let item = {
            let mut section = CriticalSection::enter(&self.state);
            let state = &mut *section;

            let Some((index, item)) = state.slots.read() else {
                unreachable!("full-slots permit held while every slot is empty");
            };
            self.printer
                .line(format_args!("Consumer {worker}: reads {item}"));
            state.stats.record_consumed(worker, state.slots.is_empty());
            debug!(%worker, item, index, occupied = state.slots.len(), "consumer read item");

            if self.snapshots {
                self.printer.snapshot(&state.slots, Some(item));
            }
            item
        };
        self.empty_slots.release();
        Ok(item)
    }

    /// Take one permit of `kind`: a non-blocking attempt first, then a
    /// notice, then a blocking wait.
    fn acquire_permit(&self, kind: SlotKind, worker: WorkerId) -> Result<(), BufferError> {
        let semaphore: &Semaphore = match kind {
            SlotKind::Empty => &*self.empty_slots,
            SlotKind::Full => &*self.full_slots,
        };

        match semaphore.try_acquire() {
            Ok(()) => return Ok(()),
            Err(TryAcquireError::Closed) => return Err(BufferError::Closed { kind }),
            Err(TryAcquireError::NoPermits) => {}
        }

        match kind {
            SlotKind::Empty => {
                debug!(%worker, "all buffers full, producer waits");
                self.printer
                    .line(format_args!("All buffers full. Producer {worker} waits."));
            }
            SlotKind::Full => {
                debug!(%worker, "all buffers empty, consumer waits");
                self.printer
                    .line(format_args!("All buffers empty. Consumer {worker} waits."));
            }
        }

        semaphore
            .acquire()
            .map_err(|_| BufferError::Closed { kind })
    }

    /// Close both semaphores. Every blocked insert/remove returns
    /// [`BufferError::Closed`], as does every later call. Operations already
    /// past their wait complete normally.
    pub fn close(&self) {
        self.empty_slots.close();
        self.full_slots.close();
        debug!("buffer closed");
    }

    pub fn is_closed(&self) -> bool {
        self.empty_slots.is_closed() && self.full_slots.is_closed()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Free-slot permits currently available.
    pub fn empty_permits(&self) -> u32 {
        self.empty_slots.available_permits()
    }

    /// Occupied-slot permits currently available.
    pub fn full_permits(&self) -> u32 {
        self.full_slots.available_permits()
    }

    /// Copy of the slot store, cursors included.
    pub fn slots(&self) -> SlotStore {
        self.state.lock().slots.clone()
    }

    /// Read out the statistics together with the remaining occupied count.
    pub fn report(&self) -> StatsReport {
        let state = self.state.lock();
        state.stats.report(self.capacity, state.slots.len())
    }
}
