//! Output sinks.
//!
//! A sink is a caller-supplied destination for emitted records. The logger
//! imposes no threading, buffering, or blocking behavior; all of that is
//! defined by the sink implementation.
//!
//! # Lifecycle
//!
//! - `open` is called once when the owning logger is constructed
//! - `write` is called once per emitted record
//! - `flush` is called on explicit flush and before `close`
//! - `close` is called once when the owning logger is dropped
//!
//! # Rules
//!
//! - `write` may block; the logger releases its internal lock around it
//! - Sinks must never call back into the logger, directly or indirectly
//! - Only the single logical consumer ever invokes sink callbacks

use crate::level::LogLevel;

/// A log output destination.
pub trait Sink {
    /// Prepare sink state. Called once at logger construction.
    fn open(&self) {}

    /// Write a single record.
    ///
    /// `msg` is the raw payload; it is not guaranteed to be UTF-8 and is
    /// not null-terminated. The sink must not read beyond the slice.
    fn write(&self, msg: &[u8], level: LogLevel);

    /// Flush any internal sink buffers.
    fn flush(&self) {}

    /// Release sink resources. Called once at logger teardown, after a
    /// final flush.
    fn close(&self) {}
}
