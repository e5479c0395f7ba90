//! Countdown for the lifetime of an issued code.
//!
//! The timer itself is a plain counter advanced by [`ExpiryTimer::tick`]. The
//! flow owns the single deadline that calls it once per second, which keeps this
//! type free of any clock and trivially testable.

use std::time::Duration;

/// Default lifetime of an issued code (15 minutes).
pub const DEFAULT_TTL_SECONDS: u32 = 900;

/// Interval between two ticks.
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpiryTimer {
    ttl_seconds: u32,
    seconds_remaining: u32,
}

impl Default for ExpiryTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECONDS)
    }
}

impl ExpiryTimer {
    #[must_use]
    pub fn new(ttl_seconds: u32) -> Self {
        Self {
            ttl_seconds,
            seconds_remaining: ttl_seconds,
        }
    }

    /// Consumes one elapsed second. Returns `false` once expired; the counter
    /// never goes below zero.
    pub fn tick(&mut self) -> bool {
        if self.is_expired() {
            return false;
        }
        self.seconds_remaining -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.seconds_remaining = self.ttl_seconds;
    }

    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> u32 {
        self.ttl_seconds
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.seconds_remaining == 0
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn format(&self) -> String {
        format_mm_ss(self.seconds_remaining)
    }
}

/// Zero-padded `MM:SS`; minutes keep growing past 99 instead of wrapping.
#[must_use]
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
