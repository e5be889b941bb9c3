// Statistics kept alongside the slot store. Mutated only under the buffer's
// mutex, so plain integers suffice.

use std::collections::BTreeMap;
use std::fmt;

use crate::Core::futex::current_thread_id;

/// Identity of a producer or consumer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub u64);

impl WorkerId {
    /// The calling thread's id.
    pub fn current() -> Self {
        WorkerId(current_thread_id())
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Running totals and per-worker tallies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    produced: u64,
    consumed: u64,
    times_full: u64,
    times_empty: u64,
    produced_by: BTreeMap<WorkerId, u64>,
    consumed_by: BTreeMap<WorkerId, u64>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one insert by `worker`. `now_full` is whether the insert
    /// filled the last free slot.
    pub fn record_produced(&mut self, worker: WorkerId, now_full: bool) {
        self.produced += 1;
        *self.produced_by.entry(worker).or_insert(0) += 1;
        if now_full {
            self.times_full += 1;
        }
    }

    /// Records one remove by `worker`. `now_empty` is whether the remove
    /// took the last occupied slot.
    pub fn record_consumed(&mut self, worker: WorkerId, now_empty: bool) {
        self.consumed += 1;
        *self.consumed_by.entry(worker).or_insert(0) += 1;
        if now_empty {
            self.times_empty += 1;
        }
    }

    /// Copies the counters out, together with the live occupied count.
    pub fn report(&self, capacity: usize, remaining: usize) -> StatsReport {
        StatsReport {
            capacity,
            produced: self.produced,
            consumed: self.consumed,
            times_full: self.times_full,
            times_empty: self.times_empty,
            remaining,
            produced_by: self.produced_by.iter().map(|(w, n)| (*w, *n)).collect(),
            consumed_by: self.consumed_by.iter().map(|(w, n)| (*w, *n)).collect(),
        }
    }
}

/// Point-in-time read-out of [`Statistics`].
///
/// Per-worker tallies are ordered by worker id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsReport {
    pub capacity: usize,
    pub produced: u64,
    pub consumed: u64,
    pub times_full: u64,
    pub times_empty: u64,
    /// Occupied slots at the time of the read-out.
    pub remaining: usize,
    pub produced_by: Vec<(WorkerId, u64)>,
    pub consumed_by: Vec<(WorkerId, u64)>,
}

impl StatsReport {
    /// Tally for one producer, 0 if it never produced.
    pub fn produced_by(&self, worker: WorkerId) -> u64 {
        tally(&self.produced_by, worker)
    }

    /// Tally for one consumer, 0 if it never consumed.
    pub fn consumed_by(&self, worker: WorkerId) -> u64 {
        tally(&self.consumed_by, worker)
    }
}

fn tally(entries: &[(WorkerId, u64)], worker: WorkerId) -> u64 {
    entries
        .iter()
        .find(|(w, _)| *w == worker)
        .map_or(0, |(_, n)| *n)
}
