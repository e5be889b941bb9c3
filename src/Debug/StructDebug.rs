use std::fmt;
use crate::Core::Semaphore;
use crate::MPMC::Buffer::{BoundedBuffer, SlotStore};

/// Debug function for BoundedBuffer
///
/// Shows:
/// - Capacity and snapshot flag
/// - Available permits on both semaphores
/// - The slot store, or `<locked>` if another thread holds the buffer mutex
///
/// Never blocks: the mutex is only tried.
pub fn debug_bounded_buffer(buffer: &BoundedBuffer, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut s = f.debug_struct("BoundedBuffer");
    s.field("capacity", &buffer.capacity)
        .field("snapshots", &buffer.snapshots)
        .field("empty_slots", &*buffer.empty_slots)
        .field("full_slots", &*buffer.full_slots);
    match buffer.state.try_lock() {
        Some(state) => s.field("slots", &state.slots).field("stats", &state.stats),
        None => s.field("slots", &format_args!("<locked>")),
    };
    s.finish()
}

/// Debug function for SlotStore
pub fn debug_slot_store(store: &SlotStore, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SlotStore")
        .field("slots", &store.slots())
        .field("read_index", &store.read_index())
        .field("write_index", &store.write_index())
        .field("count", &store.len())
        .finish()
}

/// Debug function for Semaphore
pub fn debug_semaphore(semaphore: &Semaphore, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Semaphore")
        .field("permits", &semaphore.available_permits())
        .field("closed", &semaphore.is_closed())
        .finish()
}
