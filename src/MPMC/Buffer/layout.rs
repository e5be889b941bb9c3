// Circular slot store backing the bounded buffer. No synchronization of its
// own: every access goes through the buffer's mutex.

/// The value type carried by the buffer.
pub type BufferItem = i32;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 5;

/// Largest accepted capacity. Slots are allocated up front.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Fixed-size array of slots with read and write cursors.
///
/// ### Invariants
/// - `read_index` and `write_index` are always in `[0, capacity)` and only
///   move forward with wraparound.
/// - The number of `Some` slots equals `count`, and `count` is in
///   `[0, capacity]`.
/// - Occupied slots are exactly the `count` positions starting at
///   `read_index`, so items leave in the order they arrived.
#[derive(Clone, PartialEq, Eq)]
pub struct SlotStore {
    /// The slots. `None` is the empty marker.
    slots: Box<[Option<BufferItem>]>,

    /// Next slot to read from.
    read_index: usize,

    /// Next slot to write into.
    write_index: usize,

    /// Number of occupied slots.
    count: usize,
}

impl SlotStore {
    /// Creates a store with every slot empty and both cursors at 0.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "slot store capacity must be at least 1");
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            read_index: 0,
            write_index: 0,
            count: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    #[inline]
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    #[inline]
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// The raw slot contents, indexed by position.
    pub fn slots(&self) -> &[Option<BufferItem>] {
        &self.slots
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }

    /// Writes `item` at the write cursor and advances it.
    ///
    /// Returns the index written, or `None` if every slot is occupied.
    pub fn write(&mut self, item: BufferItem) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let index = self.write_index;
        debug_assert!(self.slots[index].is_none());
        self.slots[index] = Some(item);
        self.write_index = self.advance(index);
        self.count += 1;
        Some(index)
    }

    /// Takes the item at the read cursor, clears its slot and advances.
    ///
    /// Returns the index read with its item, or `None` if the store is empty.
    pub fn read(&mut self) -> Option<(usize, BufferItem)> {
        if self.is_empty() {
            return None;
        }
        let index = self.read_index;
        let item = self.slots[index].take()?;
        self.read_index = self.advance(index);
        self.count -= 1;
        Some((index, item))
    }
}
