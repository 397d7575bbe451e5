//! Debounced scheduling for automatic validation.
//!
//! This module provides [`DebounceScheduler`], a single-slot timer: arming
//! it supersedes whatever was armed before, so at most one callback is ever
//! outstanding. Cancellation aborts the timer task; a fire that was already
//! queued when the abort landed is identified by its epoch and discarded by
//! the consumer.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Default quiet window after the last qualifying edit before
/// auto-validation fires.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Single-slot debounce timer with epoch-based stale-fire detection.
///
/// Each call to [`schedule`](DebounceScheduler::schedule) or
/// [`cancel`](DebounceScheduler::cancel) advances the epoch. The armed
/// callback receives the epoch it was armed with;
/// [`is_current`](DebounceScheduler::is_current) then tells the consumer
/// whether that fire still speaks for the latest arming.
pub struct DebounceScheduler {
    /// Duration to wait before firing
    delay: Duration,
    /// Generation counter; bumped on every schedule and cancel
    epoch: u64,
    /// Handle of the armed timer task, if any
    timer: Option<JoinHandle<()>>,
}

impl DebounceScheduler {
    /// Create a new scheduler with the default delay.
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            epoch: 0,
            timer: None,
        }
    }

    /// Set a custom delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer, superseding any previously armed callback.
    ///
    /// `on_elapsed` runs on a spawned task after the delay and receives the
    /// epoch this arming was assigned. Returns that epoch.
    pub fn schedule<F>(&mut self, on_elapsed: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.epoch += 1;
        let epoch = self.epoch;

        // Guard: only spawn if a tokio runtime is available (avoids panics in sync tests)
        let Ok(_handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(epoch, "No async runtime available, timer not armed");
            return epoch;
        };

        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::trace!(epoch, "Debounce window elapsed");
            on_elapsed(epoch);
        }));

        epoch
    }

    /// Disarm the timer. Safe to call when nothing is armed.
    ///
    /// The epoch advances even when no timer was armed, so a fire that
    /// raced the abort can never pass [`is_current`](Self::is_current).
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.epoch += 1;
    }

    /// Check whether a fired epoch still speaks for the latest arming.
    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch
    }

    /// Check if a timer task is currently armed.
    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.timer
            .as_ref()
            .map(|timer| !timer.is_finished())
            .unwrap_or(false)
    }
}

impl Default for DebounceScheduler {
    fn default() -> Self {
        Self::new()
    }
}
