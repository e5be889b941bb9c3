use super::layout::SlotStore;
use super::Buffer::BoundedBuffer;
use crate::Core::Semaphore;
use std::fmt;

// Debug proxy implementations that call the standalone debug functions
impl fmt::Debug for BoundedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_bounded_buffer(self, f)
    }
}

impl fmt::Debug for SlotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_slot_store(self, f)
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_semaphore(self, f)
    }
}
