//! Cancellable delayed evaluation.
//!
//! Search input is applied only after the user pauses typing. Each new
//! value cancels the pending one and restarts the delay; the value fires at
//! most once. The owner polls with the current time on every tick, so no
//! timer thread is needed.

use std::time::{Duration, Instant};

/// Default delay between the last keystroke and applying a search.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// A value scheduled to fire after a quiet period.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Default for Debounced<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl<T> Debounced<T> {
    /// Create an idle debouncer.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing any pending one.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    /// Whether a value is waiting to fire.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value fires.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Fire the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.cancel(),
            _ => None,
        }
    }
}
