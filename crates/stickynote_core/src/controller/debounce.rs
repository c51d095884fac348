//! Single-shot, cancellable deferred payload.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending<T> {
    deadline: Duration,
    payload: T,
}

/// Holds the latest payload until `delay` passes without a re-arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceTimer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> DebounceTimer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending payload and restarts the quiet period.
    ///
    /// Returns the new deadline.
    pub fn arm(&mut self, now: Duration, payload: T) -> Duration {
        let deadline = now + self.delay;
        self.pending = Some(Pending { deadline, payload });
        deadline
    }

    /// Drops the pending payload without firing, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.payload)
    }

    /// Fires at most once: yields the payload when its deadline has passed.
    pub fn fire_if_due(&mut self, now: Duration) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .map_or(false, |pending| pending.deadline <= now);
        if due {
            self.cancel()
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}
