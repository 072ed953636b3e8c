//! Pages, cursors and the tickets that tie a fetch to its session.

use crate::model::criteria::SearchCriteria;
use crate::model::identifiers::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single item descriptor in a result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Identity key; the list never shows the same key twice.
    pub id: ItemId,
    /// Display line.
    pub title: String,
}

impl ResultItem {
    /// Item with a display title.
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Zero-based page index within one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageCursor(u32);

impl PageCursor {
    /// The first page of a session.
    pub const FIRST: PageCursor = PageCursor(0);

    /// Cursor at a zero-based page index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Zero-based index.
    pub fn index(&self) -> u32 {
        self.0
    }

    /// True for page 0.
    pub fn is_first(&self) -> bool {
        self.0 == 0
    }

    /// Cursor of the following page. Saturates rather than wrapping.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Offset of the first item of this page for a given page size.
    pub fn offset(&self, page_size: usize) -> usize {
        (self.0 as usize).saturating_mul(page_size)
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}", self.0)
    }
}

/// Identity of a pagination session.
///
/// Generation numbers are handed out by the controller in strictly increasing
/// order, so comparing ids is how a late completion learns it is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Id for a controller generation number.
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// Generation number this id was built from.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Tags a page request and its completion with the session and page it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    /// Session that issued the request.
    pub session: SessionId,
    /// Page requested.
    pub cursor: PageCursor,
}

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session, self.cursor.index())
    }
}

/// Work item handed to the data source: fetch `cursor` of `criteria`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Identifies the completion when it comes back.
    pub ticket: FetchTicket,
    /// Criteria the session was created for.
    pub criteria: SearchCriteria,
    /// Items per page.
    pub page_size: usize,
}

/// What the data source returns for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Items in source order.
    pub items: Vec<ResultItem>,
    /// Total number of matching items, when the source knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Explicit end marker; a short page also ends the listing.
    #[serde(default)]
    pub end_of_results: bool,
}

impl FetchedPage {
    /// Page with no total and no end marker.
    pub fn new(items: Vec<ResultItem>) -> Self {
        Self {
            items,
            total: None,
            end_of_results: false,
        }
    }

    /// Record the total match count.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Mark this as the last page.
    pub fn ending(mut self) -> Self {
        self.end_of_results = true;
        self
    }
}

/// A page accepted by its session, ready for the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    /// Session the page was accepted by.
    pub session: SessionId,
    /// Items in received order.
    pub items: Vec<ResultItem>,
    /// True iff this is the first page of its session.
    pub first: bool,
}

impl ResultPage {
    /// True when the page carries no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items on the page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
