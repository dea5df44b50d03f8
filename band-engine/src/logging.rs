//! FILENAME: band-engine/src/logging.rs
// PURPOSE: Category-tagged logging macros over the `log` facade.
// CONTEXT: Every line carries a category ("RUN", "BREAK", "PAGE", "VARS",
//          "CHILD") as its log target so hosts can filter per subsystem.
//          The engine never installs a logger itself.

pub const CAT_RUN: &str = "RUN";
pub const CAT_BREAK: &str = "BREAK";
pub const CAT_PAGE: &str = "PAGE";
pub const CAT_VARS: &str = "VARS";
pub const CAT_CHILD: &str = "CHILD";

// ============================================================================
// MACRO DEFINITIONS
// ============================================================================

macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        ::log::debug!(target: $cat, $($arg)*)
    };
}

macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        ::log::info!(target: $cat, $($arg)*)
    };
}

macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        ::log::warn!(target: $cat, $($arg)*)
    };
}

macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        ::log::error!(target: $cat, $($arg)*)
    };
}

// ENTER/EXIT macros for function tracing

macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        ::log::debug!(target: $cat, "ENTER {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        ::log::debug!(target: $cat, "ENTER {} {}", $func, format_args!($($arg)*))
    };
}

macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        ::log::debug!(target: $cat, "EXIT {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        ::log::debug!(target: $cat, "EXIT {} {}", $func, format_args!($($arg)*))
    };
}

// Re-export the macros so they can be imported via `use crate::logging::log_info;`
pub(crate) use log_debug;
pub(crate) use log_enter;
pub(crate) use log_error;
pub(crate) use log_exit;
pub(crate) use log_info;
pub(crate) use log_warn;
