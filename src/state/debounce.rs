//! Query debouncer (pure).
//!
//! Collapses bursts of criteria changes into a single "search changed"
//! signal. There is exactly one pending timer: every notification cancels it
//! and schedules a new deadline, so a burst fires once, after it settles.

use std::time::{Duration, Instant};
use tracing::trace;

/// Default settle time after a keystroke in the query box.
pub const DEFAULT_TEXT_DELAY: Duration = Duration::from_millis(500);

/// Default settle time after a filter or sort change.
pub const DEFAULT_STRUCTURED_DELAY: Duration = Duration::from_millis(100);

/// Which input produced a criteria change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// Search box.
    QueryText,
    /// Ruleset filter.
    Ruleset,
    /// Category filter.
    Category,
    /// Sort field picker.
    SortField,
    /// Sort direction toggle.
    SortDirection,
}

impl ChangeSource {
    /// Free-text input fires on every keystroke and gets the long delay.
    pub fn is_free_text(&self) -> bool {
        matches!(self, ChangeSource::QueryText)
    }
}

/// The two delay classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceDelays {
    /// Delay after a query text edit.
    pub text: Duration,
    /// Delay after any other change.
    pub structured: Duration,
}

impl DebounceDelays {
    /// Delay for a change from `source`.
    pub fn for_source(&self, source: ChangeSource) -> Duration {
        if source.is_free_text() {
            self.text
        } else {
            self.structured
        }
    }
}

impl Default for DebounceDelays {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_DELAY,
            structured: DEFAULT_STRUCTURED_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    due: Instant,
    source: ChangeSource,
}

/// Single-slot cancellable deferred "search changed" signal.
#[derive(Debug, Clone)]
pub struct QueryDebouncer {
    delays: DebounceDelays,
    pending: Option<Pending>,
}

impl QueryDebouncer {
    /// Debouncer with nothing pending.
    pub fn new(delays: DebounceDelays) -> Self {
        Self {
            delays,
            pending: None,
        }
    }

    /// Configured delays.
    pub fn delays(&self) -> DebounceDelays {
        self.delays
    }

    /// Schedule the signal, replacing any pending one.
    ///
    /// Returns the new deadline. The delay is chosen by the source of *this*
    /// notification, so the latest change decides how long to settle.
    pub fn notify(&mut self, source: ChangeSource, now: Instant) -> Instant {
        let due = now + self.delays.for_source(source);
        if let Some(previous) = self.pending.replace(Pending { due, source }) {
            trace!(
                previous = ?previous.source,
                source = ?source,
                "debounce timer reset"
            );
        }
        due
    }

    /// Fire the signal if its deadline has passed.
    ///
    /// Fires at most once per schedule; the timer is cleared on firing.
    pub fn poll(&mut self, now: Instant) -> Option<ChangeSource> {
        match self.pending {
            Some(pending) if now >= pending.due => {
                self.pending = None;
                Some(pending.source)
            }
            _ => None,
        }
    }

    /// Drop the pending signal. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// True while a signal is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending signal fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }
}

impl Default for QueryDebouncer {
    fn default() -> Self {
        Self::new(DebounceDelays::default())
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
