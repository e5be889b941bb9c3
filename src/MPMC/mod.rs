mod builder;
mod consumer;
mod producer;
pub mod snapshot;

pub use builder::BufferBuilder;
pub(crate) use builder::validate_capacity;
pub use consumer::Consumer;
pub use producer::{Producer, ITEM_RANGE};

pub mod Buffer {
    pub mod Buffer;
    pub mod Buffer_impl;
    mod debug;
    pub mod layout;
    pub use layout::{BufferItem, SlotStore, DEFAULT_CAPACITY, MAX_CAPACITY};
    pub use Buffer::BoundedBuffer; // re-export for stable path
}

pub mod Structs {
    pub mod Stats_Structs;
    pub use Stats_Structs::{Statistics, StatsReport, WorkerId}; // re-export for stable path
}

use crate::Core::Shutdown;
use std::time::Duration;

/// Draws one pause length in `[1, max_sleep]`, or `None` if `max_sleep`
/// is zero.
///
/// A whole-second maximum yields whole seconds, so `max_sleep` of 1s always
/// pauses exactly 1s. Anything else is drawn in milliseconds.
pub fn pause_length(max_sleep: Duration) -> Option<Duration> {
    if max_sleep.is_zero() {
        return None;
    }
    if max_sleep.subsec_nanos() == 0 {
        return Some(Duration::from_secs(fastrand::u64(1..=max_sleep.as_secs())));
    }
    let max_ms = max_sleep.as_millis().clamp(1, u64::MAX as u128) as u64;
    Some(Duration::from_millis(fastrand::u64(1..=max_ms)))
}

/// Sleeps one [`pause_length`] between operations.
///
/// Returns false if shutdown interrupted the sleep.
pub(crate) fn random_pause(shutdown: &Shutdown, max_sleep: Duration) -> bool {
    match pause_length(max_sleep) {
        Some(pause) => shutdown.sleep(pause),
        None => true,
    }
}
