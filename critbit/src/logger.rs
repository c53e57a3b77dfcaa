// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! Logging macros, forwarded to `log` with the `logger` feature.

// Without the feature every macro is a runtime no-op

#[cfg(feature = "logger")]
pub use log::{debug, error, trace, warn};

/// Returns true if the trace log level is enabled
#[cfg(feature = "logger")]
#[must_use]
pub fn trace_enabled() -> bool {
    log::log_enabled!(log::Level::Trace)
}

#[cfg(not(feature = "logger"))]
pub use noop_logger::{debug, error, trace, trace_enabled, warn};

#[cfg(not(feature = "logger"))]
mod noop_logger {
    #[macro_export]
    /// Swallows its arguments when the `logger` feature is disabled
    macro_rules! critbit_noop_log {
        ($($arg:tt)+) => {
            if $crate::logger::trace_enabled() {
                // never taken; keeps the arguments "used" for the compiler
                let _ = format!($($arg)+);
            }
        };
    }

    pub use crate::critbit_noop_log as debug;
    pub use crate::critbit_noop_log as error;
    pub use crate::critbit_noop_log as trace;
    pub use crate::critbit_noop_log as warn;

    /// Without the `logger` feature nothing is ever traced
    #[inline]
    #[must_use]
    pub const fn trace_enabled() -> bool {
        false
    }
}
