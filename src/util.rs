//! Utility functions shared across modules.

use std::time::Duration;

/// Formats a duration in microseconds into a human-readable string (µs, ms, or s).
#[inline]
pub fn format_us(us: u64) -> String {
    if us < 1000 {
        format!("{us} µs")
    } else if us < 1_000_000 {
        format!("{:.1} ms", us as f64 / 1000.0)
    } else {
        format!("{:.3} s", us as f64 / 1_000_000.0)
    }
}

/// Formats an offset from the first notification, padded for aligned output.
pub fn format_relative_us(relative_us: u64) -> String {
    format!("{:<10}", format!("+{}", format_us(relative_us)))
}

/// Formats a `std::time::Duration` into a human-readable string using `humantime`.
#[inline]
pub fn format_duration(duration: Duration) -> String {
    humantime::format_duration(duration).to_string()
}

/// Converts an event timestamp (µs) to the millisecond clock of the motion filter.
#[inline]
pub const fn us_to_ms(us: u64) -> u64 {
    us / 1000
}
