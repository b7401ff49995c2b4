//! Leading+trailing rate limiting for autocomplete dispatch.

use std::time::{Duration, Instant};

/// Coalesces a burst of values into at most two firings per window: the
/// first fires immediately, the last fires once the window has elapsed, and
/// intermediates are dropped.
///
/// Poll-driven — nothing fires spontaneously; the owner calls
/// [`poll`](Self::poll) from its tick. Every method takes `now`, so callers
/// control the clock and tests need no sleeping.
#[derive(Debug)]
pub struct Throttle<T> {
    window: Duration,
    last_fired: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
            pending: None,
        }
    }

    /// Offer a value. Returns it back when it should fire now (leading
    /// edge); otherwise stores it as the trailing candidate, replacing any
    /// value coalesced earlier in the burst.
    pub fn submit(&mut self, now: Instant, value: T) -> Option<T> {
        if self.is_open(now) {
            self.last_fired = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Fire the trailing candidate once the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.is_open(now) {
            self.last_fired = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    fn is_open(&self, now: Instant) -> bool {
        self.last_fired
            .is_none_or(|fired| now.duration_since(fired) >= self.window)
    }
}
