//! Multi-producer / concurrent-consumer tests.
//!
//! The logger itself stays passive; these tests drive it from several
//! producer threads and one consumer thread, with `SpinLock` hooks
//! serializing the shared state and `GlobalHeap` absorbing ring overflow
//! so no record is ever dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use logring::{log_info, AsyncLogger, GlobalHeap, LogLevel, Sink, SpinLock};

/// Thread-safe sink collecting raw payloads.
#[derive(Default)]
struct CollectingSink {
    writes: Mutex<Vec<Vec<u8>>>,
}

impl CollectingSink {
    fn count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn messages(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|msg| String::from_utf8_lossy(msg).into_owned())
            .collect()
    }
}

impl Sink for CollectingSink {
    fn write(&self, msg: &[u8], _level: LogLevel) {
        self.writes.lock().unwrap().push(msg.to_vec());
    }
}

const PRODUCERS: usize = 4;
const PER_PRODUCER: usize = 5000;

#[test]
fn test_multi_producer_gap_free_ascending_delivery() {
    let mut storage = vec![0u8; 2048];
    let sink = CollectingSink::default();
    let sinks: [&dyn Sink; 1] = [&sink];
    let logger = AsyncLogger::with_hooks(&mut storage, &sinks, SpinLock::new(), GlobalHeap);

    // Tagging and capture happen as one critical section, so delivery
    // order must reproduce tag order exactly.
    let tagger = Mutex::new(0u64);
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        let mut producers = Vec::new();
        for _ in 0..PRODUCERS {
            producers.push(s.spawn(|| {
                for _ in 0..PER_PRODUCER {
                    let mut next = tagger.lock().unwrap();
                    *next += 1;
                    log_info!(logger, "t-{}", *next);
                }
            }));
        }
        s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                logger.process();
                std::thread::yield_now();
            }
        });

        for producer in producers {
            producer.join().unwrap();
        }
        done.store(true, Ordering::Release);
    });

    logger.drain();

    assert_eq!(logger.dropped(), 0);
    let messages = sink.messages();
    assert_eq!(messages.len(), PRODUCERS * PER_PRODUCER);
    for (i, msg) in messages.iter().enumerate() {
        assert_eq!(msg, &format!("t-{}", i + 1));
    }
}

#[test]
fn test_multi_producer_per_thread_fifo() {
    let mut storage = vec![0u8; 2048];
    let sink = CollectingSink::default();
    let sinks: [&dyn Sink; 1] = [&sink];
    let logger = AsyncLogger::with_hooks(&mut storage, &sinks, SpinLock::new(), GlobalHeap);

    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        let mut producers = Vec::new();
        for p in 0..PRODUCERS {
            let logger = &logger;
            producers.push(s.spawn(move || {
                for j in 0..PER_PRODUCER {
                    log_info!(logger, "p{}-{}", p, j);
                }
            }));
        }
        s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                logger.process();
                std::thread::yield_now();
            }
        });

        for producer in producers {
            producer.join().unwrap();
        }
        done.store(true, Ordering::Release);
    });

    logger.drain();

    assert_eq!(logger.dropped(), 0);
    let messages = sink.messages();
    assert_eq!(messages.len(), PRODUCERS * PER_PRODUCER);

    // Capture order within each producer must survive the merge.
    let mut next_per_producer = [0usize; PRODUCERS];
    for msg in &messages {
        let (p, j) = msg[1..].split_once('-').unwrap();
        let p: usize = p.parse().unwrap();
        let j: usize = j.parse().unwrap();
        assert_eq!(j, next_per_producer[p], "out of order for producer {}", p);
        next_per_producer[p] += 1;
    }
    assert!(next_per_producer.iter().all(|&n| n == PER_PRODUCER));
}

#[test]
fn test_concurrent_capture_while_draining_loses_nothing() {
    let mut storage = vec![0u8; 512];
    let sink = CollectingSink::default();
    let sinks: [&dyn Sink; 1] = [&sink];
    let logger = AsyncLogger::with_hooks(&mut storage, &sinks, SpinLock::new(), GlobalHeap);

    let captured = AtomicU64::new(0);

    std::thread::scope(|s| {
        let producer = s.spawn(|| {
            for i in 0..10_000u64 {
                log_info!(logger, "{}", i);
                captured.fetch_add(1, Ordering::Relaxed);
            }
        });

        // Drain aggressively while the producer is still running.
        while !producer.is_finished() {
            logger.process_n(16);
        }
        producer.join().unwrap();
    });

    logger.drain();
    assert_eq!(logger.dropped(), 0);
    assert_eq!(sink.count() as u64, captured.load(Ordering::Relaxed));
}
