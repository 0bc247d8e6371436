//! Capture macros.
//!
//! Thin wrappers around `format_args!` so the rendered arguments never
//! touch an intermediate allocation. They work with both
//! [`AsyncLogger`](crate::AsyncLogger) and
//! [`SyncLogger`](crate::SyncLogger).

/// Capture a formatted record at an explicit level.
///
/// # Example
///
/// ```ignore
/// log_at!(logger, LogLevel::Info, "tick {} at {}", n, t);
/// ```
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)*) => {
        $logger.log($level, format_args!($($arg)*))
    };
}

/// Capture at `Trace`.
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::LogLevel::Trace, $($arg)*)
    };
}

/// Capture at `Debug`.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::LogLevel::Debug, $($arg)*)
    };
}

/// Capture at `Info`.
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::LogLevel::Info, $($arg)*)
    };
}

/// Capture at `Warn`.
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::LogLevel::Warn, $($arg)*)
    };
}

/// Capture at `Error`.
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::LogLevel::Error, $($arg)*)
    };
}

/// Capture at `Fatal`.
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::LogLevel::Fatal, $($arg)*)
    };
}
