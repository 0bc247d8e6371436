//! Synchronous logger: format into a borrowed buffer, emit immediately.
//!
//! No queueing, no ordering problem, no locking. Every capture renders
//! into the single shared buffer and is handed to all sinks before the
//! call returns, so sinks must tolerate being called from whatever
//! context logs. Not thread-safe; `&mut self` makes that explicit.

use core::fmt::Arguments;

use crate::fmt;
use crate::level::LogLevel;
use crate::sink::Sink;

/// Synchronous, unbuffered-path logger over a caller-supplied buffer.
pub struct SyncLogger<'a> {
    buffer: &'a mut [u8],
    sinks: &'a [&'a dyn Sink],
    level: LogLevel,
    /// Records whose rendering did not fit the buffer; the clipped prefix
    /// was still emitted.
    truncated: u64,
}

impl<'a> SyncLogger<'a> {
    /// Create a synchronous logger. Calls `open` on every sink.
    ///
    /// `buffer` is the formatting scratch space; a render longer than the
    /// buffer is clipped and counted.
    pub fn new(buffer: &'a mut [u8], sinks: &'a [&'a dyn Sink]) -> Self {
        for sink in sinks {
            sink.open();
        }
        Self {
            buffer,
            sinks,
            level: LogLevel::Trace,
            truncated: 0,
        }
    }

    /// Set the threshold; records below it are ignored with no side effects.
    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    /// Current threshold level.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Number of records clipped to the buffer capacity.
    pub fn truncated(&self) -> u64 {
        self.truncated
    }

    /// Format a record into the shared buffer and emit it to all sinks.
    pub fn log(&mut self, level: LogLevel, args: Arguments<'_>) {
        if level < self.level {
            return;
        }
        let (len, clipped) = fmt::format_clipped(self.buffer, args);
        if clipped {
            self.truncated += 1;
        }
        for sink in self.sinks {
            sink.write(&self.buffer[..len], level);
        }
    }

    /// Emit a raw record directly to all sinks, bypassing the buffer.
    pub fn log_raw(&mut self, level: LogLevel, msg: &[u8]) {
        if level < self.level {
            return;
        }
        for sink in self.sinks {
            sink.write(msg, level);
        }
    }

    /// Flush all sinks.
    pub fn flush(&mut self) {
        for sink in self.sinks {
            sink.flush();
        }
    }
}

impl<'a> Drop for SyncLogger<'a> {
    /// Flushes, then closes every sink.
    fn drop(&mut self) {
        for sink in self.sinks {
            sink.flush();
            sink.close();
        }
    }
}
