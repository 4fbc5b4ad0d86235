//! Logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_error, log_warn};
//!
//! log_debug!("resolved {} points", pool.len());
//! ```
//!
//! Setting the flag to `false` silences one chatty module without touching
//! `RUST_LOG` for the rest of the server.

#[doc(hidden)]
#[macro_export]
macro_rules! gated_log {
    ($level:expr, $($arg:tt)*) => {
        if ENABLE_LOGS {
            log::log!($level, $($arg)*);
        }
    };
}

/// Debug-level line, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::gated_log!(log::Level::Debug, $($arg)*)
    };
}

/// Info-level line, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::gated_log!(log::Level::Info, $($arg)*)
    };
}

/// Warn-level line, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::gated_log!(log::Level::Warn, $($arg)*)
    };
}

/// Error-level line, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::gated_log!(log::Level::Error, $($arg)*)
    };
}
