//! # logring
//!
//! Embeddable logging core for environments that forbid blocking or
//! allocating on the hot path: capture is cheap and non-blocking from any
//! producer context, emission happens later when the caller drains.
//!
//! ## Architecture
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
//! The logger creates no threads, performs no I/O of its own, and may
//! drop records under pressure (counted, never signaled as an error).
//! Synchronization and heap memory are injected through [`LockHooks`]
//! and [`MemoryHooks`]; without them the logger is single-context and
//! allocation-free.
//!
//! ## Example
//!
//! ```
//! use logring::{AsyncLogger, LogLevel, Sink};
//!
//! struct StdoutSink;
//!
//! impl Sink for StdoutSink {
//!     fn write(&self, msg: &[u8], level: LogLevel) {
//!         println!("[{}] {}", level.as_str(), String::from_utf8_lossy(msg));
//!     }
//! }
//!
//! let mut storage = [0u8; 4096];
//! let sink = StdoutSink;
//! let sinks: [&dyn Sink; 1] = [&sink];
//! let logger = AsyncLogger::new(&mut storage, &sinks);
//!
//! logring::log_info!(logger, "hello {}", 42);
//!
//! // Nothing reached the sink yet; draining is caller-driven.
//! assert_eq!(logger.process(), 1);
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod fmt;
pub mod hooks;
pub mod level;
pub mod logger;
mod macros;
mod overflow;
mod ring;
pub mod sink;
pub mod sync_logger;

#[cfg(feature = "alloc")]
pub use hooks::GlobalHeap;
#[cfg(feature = "spin")]
pub use hooks::SpinLock;
pub use hooks::{LockHooks, MemoryHooks, NoHeap, NoLock};
pub use level::LogLevel;
pub use logger::AsyncLogger;
pub use sink::Sink;
pub use sync_logger::SyncLogger;
