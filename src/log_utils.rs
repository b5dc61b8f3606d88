//! Trace logging for the per-cluster pipeline stages
//!

pub use log::debug;

/// Log a per-cluster trace message
///
/// If the verbose flag (`--log-verbose`) is set the message is printed directly to stderr, so
/// that chaining decisions can be followed without turning on debug logging for the whole run.
/// Otherwise the message is only a debug log record.
///
/// # Examples
///
/// ```ignore
/// debug_msg!(self.log_verbose, "cluster({}) adding link {}", id, link);
/// ```
macro_rules! debug_msg {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            eprintln!("[{}] {}", $crate::globals::PROGRAM_NAME, format_args!($($arg)+));
        } else {
            $crate::log_utils::debug!($($arg)+);
        }
    }
}

pub(crate) use debug_msg;
