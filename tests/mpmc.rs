use parking_lot::Mutex;
use pc_buffer::Core::cancellation_deferred;
use pc_buffer::MPMC::pause_length;
use pc_buffer::{BoundedBuffer, BufferBuilder, BufferError, SlotKind, WorkerId};
use serial_test::serial;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const PRODUCER: WorkerId = WorkerId(1);
const CONSUMER: WorkerId = WorkerId(2);

/// Output sink that keeps everything written to it.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

fn quiet_buffer(capacity: usize) -> Arc<BoundedBuffer> {
    Arc::new(
        BufferBuilder::new()
            .with_capacity(capacity)
            .with_output(io::sink())
            .build()
            .unwrap(),
    )
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
#[serial]
fn full_buffer_blocks_next_insert() {
    let buffer = quiet_buffer(5);
    for item in [10, 20, 30, 40, 50] {
        buffer.insert_as(PRODUCER, item).unwrap();
    }

    let report = buffer.report();
    assert_eq!(report.remaining, 5);
    assert_eq!(report.times_full, 1);
    assert_eq!(buffer.empty_permits(), 0);
    assert_eq!(buffer.full_permits(), 5);

    let inserted = Arc::new(AtomicBool::new(false));
    let blocked = {
        let buffer = buffer.clone();
        let inserted = inserted.clone();
        thread::spawn(move || {
            buffer.insert_as(PRODUCER, 60).unwrap();
            inserted.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(!inserted.load(Ordering::SeqCst), "insert into a full buffer must block");
    assert_eq!(buffer.occupied(), 5);

    assert_eq!(buffer.remove_as(CONSUMER).unwrap(), 10);
    blocked.join().unwrap();
    assert!(inserted.load(Ordering::SeqCst));

    let report = buffer.report();
    assert_eq!(report.remaining, 5);
    assert_eq!(report.times_full, 2);
    assert_eq!(report.produced, 6);
}

#[test]
#[serial]
fn empty_buffer_blocks_remove() {
    let buffer = quiet_buffer(5);

    let removed = Arc::new(AtomicBool::new(false));
    let blocked = {
        let buffer = buffer.clone();
        let removed = removed.clone();
        thread::spawn(move || {
            let item = buffer.remove_as(CONSUMER).unwrap();
            removed.store(true, Ordering::SeqCst);
            item
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(!removed.load(Ordering::SeqCst), "remove from an empty buffer must block");
    assert_eq!(buffer.report().times_empty, 0);

    buffer.insert_as(PRODUCER, 7).unwrap();
    assert_eq!(blocked.join().unwrap(), 7);

    let report = buffer.report();
    assert_eq!(report.remaining, 0);
    assert_eq!(report.times_empty, 1);
    assert_eq!(report.consumed, 1);
}

#[test]
fn items_leave_in_insertion_order() {
    let buffer = quiet_buffer(3);
    let mut expected = 0;
    for item in 0..10 {
        buffer.insert_as(PRODUCER, item).unwrap();
        if item % 2 == 1 {
            for _ in 0..2 {
                assert_eq!(buffer.remove_as(CONSUMER).unwrap(), expected);
                expected += 1;
            }
        }
    }
    assert_eq!(expected, 10);
    assert_eq!(buffer.occupied(), 0);
}

#[test]
fn full_and_empty_count_transitions_only() {
    let buffer = quiet_buffer(2);

    buffer.insert_as(PRODUCER, 1).unwrap();
    buffer.insert_as(PRODUCER, 2).unwrap(); // 1 -> 2: full
    buffer.remove_as(CONSUMER).unwrap();
    buffer.insert_as(PRODUCER, 3).unwrap(); // 1 -> 2: full again
    buffer.remove_as(CONSUMER).unwrap();
    buffer.remove_as(CONSUMER).unwrap(); // 1 -> 0: empty
    buffer.insert_as(PRODUCER, 4).unwrap();
    buffer.remove_as(CONSUMER).unwrap(); // 1 -> 0: empty again

    let report = buffer.report();
    assert_eq!(report.times_full, 2);
    assert_eq!(report.times_empty, 2);
    assert_eq!(report.produced, 4);
    assert_eq!(report.consumed, 4);
}

#[test]
fn per_worker_tallies() {
    let buffer = quiet_buffer(4);
    buffer.insert_as(WorkerId(10), 1).unwrap();
    buffer.insert_as(WorkerId(11), 2).unwrap();
    buffer.insert_as(WorkerId(10), 3).unwrap();
    buffer.remove_as(WorkerId(20)).unwrap();

    let report = buffer.report();
    assert_eq!(report.produced_by(WorkerId(10)), 2);
    assert_eq!(report.produced_by(WorkerId(11)), 1);
    assert_eq!(report.produced_by(WorkerId(20)), 0);
    assert_eq!(report.consumed_by(WorkerId(20)), 1);
    assert_eq!(
        report.produced_by,
        vec![(WorkerId(10), 2), (WorkerId(11), 1)],
        "tallies are ordered by worker id"
    );
}

#[test]
fn insert_without_explicit_id_uses_calling_thread() {
    let buffer = quiet_buffer(2);
    buffer.insert(5).unwrap();
    assert_eq!(buffer.remove().unwrap(), 5);

    let me = WorkerId::current();
    let report = buffer.report();
    assert_eq!(report.produced_by(me), 1);
    assert_eq!(report.consumed_by(me), 1);

    let other = thread::spawn(WorkerId::current).join().unwrap();
    assert_ne!(me, other);
}

#[test]
fn mpmc_correctness_many_threads() {
    let capacity = 5;
    let buffer = quiet_buffer(capacity);

    let producers = 4;
    let consumers = 4;
    let items_per_producer = 500;
    let total = producers * items_per_producer;

    let done = Arc::new(AtomicBool::new(false));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let monitor = {
        let buffer = buffer.clone();
        let done = done.clone();
        let max_seen = max_seen.clone();
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                let occupied = buffer.occupied();
                max_seen.fetch_max(occupied, Ordering::SeqCst);
                thread::yield_now();
            }
        })
    };

    let mut handles = vec![];

    // Spawn producers
    for p in 0..producers {
        let buffer = buffer.clone();
        handles.push(thread::spawn(move || {
            for i in 0..items_per_producer {
                let item = (p * 10_000 + i) as i32;
                buffer.insert_as(WorkerId(p as u64), item).unwrap();
            }
            Vec::new()
        }));
    }

    // Spawn consumers
    for c in 0..consumers {
        let buffer = buffer.clone();
        handles.push(thread::spawn(move || {
            let mut received = Vec::with_capacity(items_per_producer);
            for _ in 0..items_per_producer {
                received.push(buffer.remove_as(WorkerId(100 + c as u64)).unwrap());
                if fastrand::u8(..) < 16 {
                    thread::yield_now();
                }
            }
            received
        }));
    }

    let mut received: Vec<i32> = vec![];
    for h in handles {
        received.extend(h.join().unwrap());
    }
    done.store(true, Ordering::SeqCst);
    monitor.join().unwrap();

    // Every item arrives exactly once.
    received.sort_unstable();
    let mut expected: Vec<i32> = (0..producers)
        .flat_map(|p| (0..items_per_producer).map(move |i| (p * 10_000 + i) as i32))
        .collect();
    expected.sort_unstable();
    assert_eq!(received.len(), total);
    assert_eq!(received, expected);

    let report = buffer.report();
    assert!(max_seen.load(Ordering::SeqCst) <= capacity);
    assert_eq!(report.produced, total as u64);
    assert_eq!(report.consumed, total as u64);
    assert_eq!(report.remaining, 0);
    assert_eq!(report.produced_by.iter().map(|(_, n)| n).sum::<u64>(), report.produced);
    assert_eq!(report.consumed_by.iter().map(|(_, n)| n).sum::<u64>(), report.consumed);
    assert_eq!(buffer.empty_permits() as usize, capacity);
    assert_eq!(buffer.full_permits(), 0);
}

#[test]
fn single_consumer_sees_each_producer_in_order() {
    let buffer = quiet_buffer(3);
    let producers = 3;
    let per_producer = 300;

    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let buffer = buffer.clone();
            thread::spawn(move || {
                for i in 0..per_producer {
                    buffer.insert_as(WorkerId(p), (p as i32) * 1000 + i).unwrap();
                }
            })
        })
        .collect();

    let mut last = vec![-1; producers as usize];
    for _ in 0..(producers as i32 * per_producer) {
        let item = buffer.remove_as(CONSUMER).unwrap();
        let p = (item / 1000) as usize;
        assert!(item % 1000 > last[p], "producer {p} items out of order");
        last[p] = item % 1000;
    }
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(last, vec![per_producer - 1; producers as usize]);
}

#[test]
#[serial]
fn waiting_notice_printed_once_then_blocks() {
    let out = Capture::default();
    let buffer = Arc::new(
        BufferBuilder::new()
            .with_capacity(1)
            .with_output(out.clone())
            .build()
            .unwrap(),
    );
    buffer.insert_as(PRODUCER, 1).unwrap();

    let blocked = {
        let buffer = buffer.clone();
        thread::spawn(move || buffer.insert_as(WorkerId(9), 2))
    };

    assert!(wait_for(|| out.text().contains("All buffers full. Producer 9 waits.")));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(buffer.remove_as(CONSUMER).unwrap(), 1);
    blocked.join().unwrap().unwrap();

    let text = out.text();
    assert_eq!(text.matches("All buffers full. Producer 9 waits.").count(), 1);
    assert!(text.contains("Producer 1: writes 1"));
    assert!(text.contains("Consumer 2: reads 1"));
    assert!(text.contains("Producer 9: writes 2"));
    assert!(!text.contains("All buffers empty"));
}

#[test]
#[serial]
fn close_releases_blocked_workers() {
    let buffer = quiet_buffer(1);

    let consumer = {
        let buffer = buffer.clone();
        thread::spawn(move || buffer.remove_as(CONSUMER))
    };
    thread::sleep(Duration::from_millis(100));
    buffer.close();

    assert_eq!(
        consumer.join().unwrap(),
        Err(BufferError::Closed { kind: SlotKind::Full })
    );
    assert!(buffer.is_closed());
    assert_eq!(
        buffer.insert_as(PRODUCER, 1),
        Err(BufferError::Closed { kind: SlotKind::Empty })
    );

    // Nothing was mutated by the aborted calls.
    let report = buffer.report();
    assert_eq!((report.produced, report.consumed, report.remaining), (0, 0, 0));
}

/// Sink that records, per output line, whether the writing thread had
/// cancellation deferred.
#[derive(Clone, Default)]
struct DeferralRecorder(Arc<Mutex<Vec<(String, bool)>>>);

impl Write for DeferralRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let deferred = cancellation_deferred();
        let mut lines = self.0.lock();
        let text = String::from_utf8_lossy(buf);
        let continues_line = lines.last().is_some_and(|(line, _)| !line.ends_with('\n'));
        if continues_line {
            let (line, flag) = lines.last_mut().unwrap();
            line.push_str(&text);
            *flag &= deferred;
        } else {
            lines.push((text.into_owned(), deferred));
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
#[serial]
fn cancellation_deferred_only_inside_critical_section() {
    let recorder = DeferralRecorder::default();
    let buffer = Arc::new(
        BufferBuilder::new()
            .with_capacity(2)
            .with_output(recorder.clone())
            .build()
            .unwrap(),
    );

    let consumer = {
        let buffer = buffer.clone();
        thread::spawn(move || buffer.remove_as(CONSUMER))
    };
    assert!(wait_for(|| recorder
        .0
        .lock()
        .iter()
        .any(|(line, _)| line.starts_with("All buffers empty"))));

    buffer.insert_as(PRODUCER, 3).unwrap();
    assert_eq!(consumer.join().unwrap(), Ok(3));
    assert!(!cancellation_deferred());

    let lines = recorder.0.lock().clone();
    assert_eq!(lines.len(), 3);
    for (line, deferred) in lines {
        if line.starts_with("All buffers") {
            assert!(!deferred, "notice printed inside the critical section: {line}");
        } else {
            assert!(deferred, "mutation output printed outside the critical section: {line}");
        }
    }
}

#[test]
fn debug_shows_buffer_state() {
    let buffer = quiet_buffer(3);
    buffer.insert_as(PRODUCER, 4).unwrap();
    println!("Buffer Struct: {:#?}", buffer);

    let text = format!("{:?}", buffer);
    assert!(text.contains("capacity: 3"));
    assert!(text.contains("slots: [Some(4), None, None]"));
    assert!(text.contains("permits: 2"));
}

#[test]
fn pause_lengths_follow_max_sleep_granularity() {
    assert_eq!(pause_length(Duration::ZERO), None);

    for _ in 0..100 {
        assert_eq!(pause_length(Duration::from_secs(1)), Some(Duration::from_secs(1)));

        let pause = pause_length(Duration::from_secs(3)).unwrap();
        assert_eq!(pause.subsec_nanos(), 0);
        assert!((1..=3).contains(&pause.as_secs()), "{pause:?}");

        let pause = pause_length(Duration::from_millis(5)).unwrap();
        assert!(pause >= Duration::from_millis(1) && pause <= Duration::from_millis(5));
    }

    assert_eq!(
        pause_length(Duration::from_micros(300)),
        Some(Duration::from_millis(1))
    );
}
