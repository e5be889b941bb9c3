//! Serialized terminal output for the buffer: waiting notices, activity
//! lines and occupancy snapshots.

use parking_lot::Mutex;
use std::fmt::{self, Write as _};
use std::io::{self, Write};
use tracing::warn;

use super::Buffer::layout::{BufferItem, SlotStore};

/// Reference primality check by trial division over `2..n`.
pub fn is_prime(n: BufferItem) -> bool {
    if n <= 1 {
        return false;
    }
    (2..n).all(|divisor| n % divisor != 0)
}

/// Renders one snapshot of `store`.
///
/// ```text
/// (buffers occupied 2)    * * * PRIME * * *
/// buffers:    17   40    -    -    -
///           ---- ---- ---- ---- ----
///              R         W
/// ```
///
/// The PRIME marker appears only when `last_item` is prime. Empty slots
/// render as `-`; the cursor row marks `R`, `W` or `RW` under each slot.
pub fn render_snapshot(store: &SlotStore, last_item: Option<BufferItem>) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = write!(out, "(buffers occupied {})", store.len());
    if last_item.is_some_and(is_prime) {
        out.push_str("\t* * * PRIME * * *");
    }
    out.push('\n');

    out.push_str("buffers: ");
    for slot in store.slots() {
        match slot {
            Some(item) => {
                let _ = write!(out, "{item:>5}");
            }
            None => out.push_str("    -"),
        }
    }
    out.push('\n');

    out.push_str("         ");
    for _ in 0..store.capacity() {
        out.push_str(" ----");
    }
    out.push('\n');

    let mut cursors = String::from("         ");
    for index in 0..store.capacity() {
        let marker = match (index == store.read_index(), index == store.write_index()) {
            (true, true) => "RW",
            (true, false) => "R",
            (false, true) => "W",
            (false, false) => "",
        };
        let _ = write!(cursors, "{marker:>5}");
    }
    out.push_str(cursors.trim_end());
    out.push('\n');

    out
}

/// Output sink shared by every worker, guarded by its own lock so lines and
/// multi-line snapshots never interleave.
///
/// Independent of the buffer mutex: waiting notices are written without it.
pub struct SnapshotPrinter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl SnapshotPrinter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Writes one line.
    pub fn line(&self, text: fmt::Arguments<'_>) {
        let mut out = self.out.lock();
        let result = writeln!(out, "{text}").and_then(|()| out.flush());
        if let Err(e) = result {
            warn!(error = %e, "failed to write buffer output");
        }
    }

    /// Writes a rendered snapshot of `store`.
    pub fn snapshot(&self, store: &SlotStore, last_item: Option<BufferItem>) {
        let rendered = render_snapshot(store, last_item);
        let mut out = self.out.lock();
        let result = out.write_all(rendered.as_bytes()).and_then(|()| out.flush());
        if let Err(e) = result {
            warn!(error = %e, "failed to write buffer snapshot");
        }
    }
}
