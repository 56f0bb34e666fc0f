//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - Embedded (`defmt` feature): Uses defmt
//! - Host tests: Uses println!
//! - Host non-test: No-op
//!
//! The scheduler only logs outside critical sections; nothing in this
//! module may be called while interrupts are masked.

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[WARN] {}", format!($($arg)*));
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    };
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[TRACE] {}", format!($($arg)*));
    };
}
