//! Asynchronous logger: non-blocking capture, caller-driven in-order drain.
//!
//! # Architecture
//!
//! ```text
//! Producers            AsyncLogger              Consumer
//! ─────────            ───────────              ────────
//!
//! log_info!() ───▶ [ ring | overflow ] ───▶ process() ───▶ sinks
//! non-blocking       fixed    heap           caller-driven
//! no I/O             tier     tier           strict capture order
//! ```
//!
//! Capture stores a framed record in the ring, falling back to the heap
//! overflow list when the ring is momentarily full, and assigns it the
//! next sequence number. Drain merges both tiers back into one gap-free
//! sequence: the record carrying `processed + 1` is emitted next or
//! nothing is. Emission order therefore equals capture order no matter
//! which tier a record landed in.
//!
//! # Rules
//!
//! - Capture never blocks and never performs I/O; a full logger drops
//!   the record and counts it
//! - The logger creates no threads; the caller drives draining
//! - Exactly one logical consumer may call `process`/`drain`/`flush`
//! - Concurrent use requires real [`LockHooks`]; with [`NoLock`] the
//!   logger is single-context only (enforced by contract, not by the
//!   type system)
//! - The internal lock is released around every sink `write`, so a slow
//!   sink stalls only the in-flight emission, never producers

use core::cell::UnsafeCell;
use core::fmt::Arguments;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::fmt;
use crate::hooks::{LockHooks, MemoryHooks, NoHeap, NoLock};
use crate::level::LogLevel;
use crate::overflow::OverflowList;
use crate::ring::RecordRing;
use crate::sink::Sink;

/// Shared state, touched only while the lock hooks are held.
struct State<'a, M: MemoryHooks> {
    ring: RecordRing<'a>,
    overflow: OverflowList<M>,
    /// Sequence assigned to the next surviving capture; starts at 1.
    next_seq: u64,
    /// Sequence of the last record handed to sinks; starts at 0.
    processed: u64,
    /// Records neither tier could accept.
    dropped: u64,
}

/// Asynchronous ring-buffered logger.
///
/// Owns no threads, performs no I/O on capture, and never allocates
/// unless memory hooks are installed. The caller supplies the ring
/// storage and the sinks and retains ownership of both; overflow nodes
/// are the only logger-owned heap memory.
pub struct AsyncLogger<'a, L: LockHooks = NoLock, M: MemoryHooks = NoHeap> {
    state: UnsafeCell<State<'a, M>>,
    sinks: &'a [&'a dyn Sink],
    /// Threshold, read on capture before the lock is taken.
    level: AtomicU8,
    lock: L,
}

// SAFETY: all mutable state lives in the UnsafeCell and is only touched
// between lock/unlock, and sink callbacks are only reached from the single
// logical consumer. Sharing a logger across threads without real lock
// hooks, or draining from several threads at once, violates the documented
// contract and is undefined.
unsafe impl<'a, L, M> Sync for AsyncLogger<'a, L, M>
where
    L: LockHooks + Sync,
    M: MemoryHooks + Sync,
{
}

// SAFETY: the raw pointers inside `State` refer to overflow nodes and the
// borrowed ring region, both of which move with the logger.
unsafe impl<'a, L, M> Send for AsyncLogger<'a, L, M>
where
    L: LockHooks + Send,
    M: MemoryHooks + Send,
{
}

impl<'a> AsyncLogger<'a, NoLock, NoHeap> {
    /// Create a logger with no synchronization and no overflow tier.
    ///
    /// Calls `open` on every sink. The storage region is borrowed for the
    /// logger's lifetime and never freed or reallocated by it.
    pub fn new(storage: &'a mut [u8], sinks: &'a [&'a dyn Sink]) -> Self {
        Self::with_hooks(storage, sinks, NoLock, NoHeap)
    }
}

impl<'a, L: LockHooks, M: MemoryHooks> AsyncLogger<'a, L, M> {
    /// Create a logger with caller-supplied lock and memory hooks.
    ///
    /// Calls `open` on every sink.
    pub fn with_hooks(storage: &'a mut [u8], sinks: &'a [&'a dyn Sink], lock: L, memory: M) -> Self {
        for sink in sinks {
            sink.open();
        }
        Self {
            state: UnsafeCell::new(State {
                ring: RecordRing::new(storage),
                overflow: OverflowList::new(memory),
                next_seq: 1,
                processed: 0,
                dropped: 0,
            }),
            sinks,
            level: AtomicU8::new(LogLevel::Trace as u8),
            lock,
        }
    }

    /// Set the threshold; records below it are ignored with no side effects.
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Current threshold level.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Number of records dropped because neither tier could accept them.
    pub fn dropped(&self) -> u64 {
        self.lock.lock();
        // SAFETY: lock held.
        let dropped = unsafe { &*self.state.get() }.dropped;
        self.lock.unlock();
        dropped
    }

    /// Capture a formatted record.
    ///
    /// The rendered length is measured first, then exactly that many bytes
    /// are reserved (ring, else overflow) and rendered in place. Capture
    /// is fire-and-forget: on total failure the drop counter is the only
    /// signal.
    pub fn log(&self, level: LogLevel, args: Arguments<'_>) {
        if level < self.level() {
            return;
        }
        let len = fmt::written_len(args);

        self.lock.lock();
        // SAFETY: lock held.
        let state = unsafe { &mut *self.state.get() };
        let seq = state.next_seq;
        if let Some(slot) = state.ring.try_push(level, seq, len) {
            fmt::format_to_buffer(slot, args);
            state.next_seq += 1;
        } else if let Some(slot) = state.overflow.try_push(level, seq, len) {
            fmt::format_to_buffer(slot, args);
            state.next_seq += 1;
        } else {
            state.dropped += 1;
        }
        self.lock.unlock();
    }

    /// Capture a raw record without formatting. The bytes are copied.
    pub fn log_raw(&self, level: LogLevel, msg: &[u8]) {
        if level < self.level() {
            return;
        }

        self.lock.lock();
        // SAFETY: lock held.
        let state = unsafe { &mut *self.state.get() };
        let seq = state.next_seq;
        if let Some(slot) = state.ring.try_push(level, seq, msg.len()) {
            slot.copy_from_slice(msg);
            state.next_seq += 1;
        } else if let Some(slot) = state.overflow.try_push(level, seq, msg.len()) {
            slot.copy_from_slice(msg);
            state.next_seq += 1;
        } else {
            state.dropped += 1;
        }
        self.lock.unlock();
    }

    /// Emit at most `max` ready records to all sinks, in capture order.
    ///
    /// Returns the number emitted. Readiness is re-evaluated per
    /// iteration, so records captured while draining may be included.
    /// The call stops early when the record carrying `processed + 1` is
    /// in neither tier; later records are never emitted ahead of it.
    pub fn process_n(&self, max: usize) -> usize {
        let mut count = 0;

        self.lock.lock();
        while count < max {
            // SAFETY: lock held; the borrow ends before each unlock.
            let state = unsafe { &mut *self.state.get() };
            let expected = state.processed + 1;

            if let Some(frame) = state.ring.peek(expected) {
                state.processed = expected;
                self.lock.unlock();

                // SAFETY: the frame bytes stay in place until `consume`
                // advances the read cursor below; producers only write
                // into free regions.
                let payload = unsafe { core::slice::from_raw_parts(frame.payload, frame.len) };
                for sink in self.sinks {
                    sink.write(payload, frame.level);
                }
                count += 1;

                self.lock.lock();
                // SAFETY: lock re-held.
                let state = unsafe { &mut *self.state.get() };
                state.ring.consume(&frame);
                continue;
            }

            if let Some(node) = state.overflow.take_head_if(expected) {
                state.processed = expected;
                self.lock.unlock();

                // SAFETY: the node is unlinked; only this consumer can
                // reach it until it is released.
                let payload = unsafe { core::slice::from_raw_parts(node.payload(), node.len()) };
                for sink in self.sinks {
                    sink.write(payload, node.level());
                }
                count += 1;

                self.lock.lock();
                // SAFETY: lock re-held.
                let state = unsafe { &mut *self.state.get() };
                state.overflow.release(node);
                continue;
            }

            break;
        }
        self.lock.unlock();

        count
    }

    /// Emit every record that is ready, in capture order.
    pub fn process(&self) -> usize {
        self.process_n(usize::MAX)
    }

    /// Repeat [`AsyncLogger::process`] until a pass emits nothing.
    ///
    /// Returns the total emitted. Records captured while draining may be
    /// included.
    pub fn drain(&self) -> usize {
        let mut total = 0;
        loop {
            let count = self.process();
            if count == 0 {
                return total;
            }
            total += count;
        }
    }

    /// Flush all sinks. Does not emit queued records.
    pub fn flush(&self) {
        for sink in self.sinks {
            sink.flush();
        }
    }

    /// Drain everything, then flush all sinks once.
    pub fn drain_and_flush(&self) {
        self.drain();
        self.flush();
    }
}

impl<'a, L: LockHooks, M: MemoryHooks> Drop for AsyncLogger<'a, L, M> {
    /// Drains all remaining records, then flushes and closes every sink.
    fn drop(&mut self) {
        self.drain();
        for sink in self.sinks {
            sink.flush();
            sink.close();
        }
    }
}
