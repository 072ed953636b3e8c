//! Shared fixtures for unit tests.
//!
//! Builders for items and pages plus a clock that only moves when told to.

use crate::model::{FetchedPage, ItemId, ResultItem};
use std::time::{Duration, Instant};

/// Single item whose title mirrors its id.
pub fn item(id: &str) -> ResultItem {
    ResultItem::new(ItemId::new(id).expect("valid test id"), format!("title {id}"))
}

/// `count` items named `{prefix}{start}`, `{prefix}{start + 1}`, ...
pub fn items(prefix: &str, start: usize, count: usize) -> Vec<ResultItem> {
    (start..start + count)
        .map(|n| item(&format!("{prefix}{n}")))
        .collect()
}

/// Fetched page holding `items(prefix, start, count)`.
pub fn full_page(prefix: &str, start: usize, count: usize) -> FetchedPage {
    FetchedPage::new(items(prefix, start, count))
}

/// Manually advanced clock.
#[derive(Debug, Clone, Copy)]
pub struct TestClock {
    now: Instant,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance_ms(&mut self, ms: u64) -> Instant {
        self.now += Duration::from_millis(ms);
        self.now
    }
}
