//! Burst limiter for log messages triggered by hardware input.

use std::time::Duration;

/// Outcome of a single [`RateLimit::test`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitState {
    /// Below the burst limit.
    Pass,
    /// This attempt exhausted the burst; callers usually log a final
    /// "further messages suppressed" note.
    Threshold,
    /// Burst exhausted for the current interval.
    Exceeded,
}

/// Allows `burst` attempts per `interval`.
#[derive(Debug, Clone)]
pub struct RateLimit {
    interval_us: u64,
    burst: u32,
    begin_us: Option<u64>,
    num: u32,
}

impl RateLimit {
    /// An interval or burst of zero disables limiting.
    #[must_use]
    pub fn new(interval: Duration, burst: u32) -> Self {
        RateLimit {
            interval_us: interval.as_micros().try_into().unwrap_or(u64::MAX),
            burst,
            begin_us: None,
            num: 0,
        }
    }

    /// Records an attempt at `now_us` (monotonic microseconds).
    pub fn test(&mut self, now_us: u64) -> RateLimitState {
        if self.interval_us == 0 || self.burst == 0 {
            return RateLimitState::Pass;
        }

        let expired = match self.begin_us {
            None => true,
            Some(begin) => begin.saturating_add(self.interval_us) < now_us,
        };

        if expired {
            self.begin_us = Some(now_us);
            self.num = 1;
            return if self.burst == 1 {
                RateLimitState::Threshold
            } else {
                RateLimitState::Pass
            };
        }

        if self.num < self.burst {
            self.num += 1;
            if self.num == self.burst {
                RateLimitState::Threshold
            } else {
                RateLimitState::Pass
            }
        } else {
            RateLimitState::Exceeded
        }
    }
}
