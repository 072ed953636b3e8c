//! Data sources for page requests.
//!
//! This module provides:
//! - The `DataSource` trait the shell fetches pages through
//! - `CatalogSource`, an in-memory catalog loaded from JSONL or generated
//! - `FetchWorker`, which runs requests off the event loop and hands
//!   completions back over a channel
//! - `StdinFeed`, the non-blocking command line reader for the shell

use crate::model::{FetchError, FetchedPage, PageCursor, SearchCriteria};

pub mod catalog;
pub mod stdin;
pub mod worker;

pub use catalog::{CatalogEntry, CatalogSource};
pub use stdin::StdinFeed;
pub use worker::FetchWorker;

/// Something that can answer "page `cursor` of `criteria`".
///
/// Implementations must be safe to call again for the same arguments; a
/// failed page is retried by asking for the same cursor.
pub trait DataSource: Send + Sync {
    /// Fetch one page of results.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the page cannot be produced. The error is
    /// terminal to this one request only.
    fn fetch_page(
        &self,
        criteria: &SearchCriteria,
        cursor: PageCursor,
        page_size: usize,
    ) -> Result<FetchedPage, FetchError>;
}
