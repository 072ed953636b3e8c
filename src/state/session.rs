//! Pagination session (pure).
//!
//! One session owns the progress of one criteria value: the page cursor, the
//! single outstanding request, and whether the listing has ended. A session is
//! replaced, never reused, when the criteria change; once invalidated it can
//! still receive a late completion but turns it into `Discarded`.

use crate::model::{
    FetchError, FetchRequest, FetchTicket, FetchedPage, PageCursor, ResultPage, SearchCriteria,
    SessionId,
};
use tracing::{debug, warn};

/// Coarse state of a session, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Ready to request the next page.
    Idle,
    /// A request is outstanding.
    Fetching,
    /// The last request failed; waiting to be re-armed.
    Failed,
    /// The listing has ended.
    Exhausted,
    /// Superseded or torn down.
    Invalidated,
}

/// Record of the most recent failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Page that failed.
    pub cursor: PageCursor,
    /// Why it failed.
    pub error: FetchError,
}

/// Why a completion was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The session was invalidated while the request was outstanding.
    Superseded,
    /// The ticket does not match the outstanding request.
    UnexpectedTicket,
}

/// Result of feeding a completion to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Accepted; hand the page to the aggregator.
    Delivered(ResultPage),
    /// The request failed; the cursor stays put.
    Failed(FetchError),
    /// Stale; nothing may be rendered.
    Discarded(DiscardReason),
}

/// Progress through the pages of one criteria value, with at most one
/// request outstanding.
#[derive(Debug, Clone)]
pub struct PaginationSession {
    id: SessionId,
    criteria: SearchCriteria,
    page_size: usize,
    cursor: PageCursor,
    in_flight: Option<FetchTicket>,
    exhausted: bool,
    current: bool,
    received: usize,
    total_known: Option<usize>,
    failure: Option<FetchFailure>,
    failures: u32,
}

impl PaginationSession {
    /// Fresh session bound to `criteria`.
    ///
    /// `page_size` is passed to the data source as given; a zero size is
    /// rejected there as `FetchError::Malformed`.
    pub fn new(id: SessionId, criteria: SearchCriteria, page_size: usize) -> Self {
        Self {
            id,
            criteria,
            page_size,
            cursor: PageCursor::FIRST,
            in_flight: None,
            exhausted: false,
            current: true,
            received: 0,
            total_known: None,
            failure: None,
            failures: 0,
        }
    }

    /// Issue the request for the next page.
    ///
    /// Returns `None` without side effects when a request is already
    /// outstanding, the listing is exhausted, the session is no longer current,
    /// or a failure has not been re-armed.
    pub fn fetch_next_page(&mut self) -> Option<FetchRequest> {
        if !self.can_fetch() {
            return None;
        }

        let ticket = FetchTicket {
            session: self.id,
            cursor: self.cursor,
        };
        self.in_flight = Some(ticket);
        debug!(%ticket, "page requested");

        Some(FetchRequest {
            ticket,
            criteria: self.criteria.clone(),
            page_size: self.page_size,
        })
    }

    /// Feed the completion of a request issued by this session.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchedPage, FetchError>,
    ) -> PageOutcome {
        if !self.current {
            debug!(%ticket, "completion for invalidated session discarded");
            return PageOutcome::Discarded(DiscardReason::Superseded);
        }
        if self.in_flight != Some(ticket) {
            debug!(%ticket, expected = ?self.in_flight, "unexpected completion discarded");
            return PageOutcome::Discarded(DiscardReason::UnexpectedTicket);
        }
        self.in_flight = None;

        match result {
            Ok(page) => PageOutcome::Delivered(self.accept(page)),
            Err(error) => {
                warn!(%ticket, %error, "page request failed");
                self.failures += 1;
                self.failure = Some(FetchFailure {
                    cursor: ticket.cursor,
                    error: error.clone(),
                });
                PageOutcome::Failed(error)
            }
        }
    }

    fn accept(&mut self, page: FetchedPage) -> ResultPage {
        let first = self.cursor.is_first();
        let count = page.items.len();

        self.cursor = self.cursor.next();
        self.received += count;
        self.failure = None;
        if page.total.is_some() {
            self.total_known = page.total;
        }

        let reached_total = self
            .total_known
            .is_some_and(|total| self.received >= total);
        self.exhausted = count < self.page_size || page.end_of_results || reached_total;

        debug!(
            session = %self.id,
            count,
            received = self.received,
            exhausted = self.exhausted,
            "page accepted"
        );

        ResultPage {
            session: self.id,
            items: page.items,
            first,
        }
    }

    /// Mark the session as no longer current.
    ///
    /// An outstanding request is left to finish; its completion is discarded.
    /// Returns true if a request was outstanding at the time.
    pub fn invalidate(&mut self) -> bool {
        self.current = false;
        self.in_flight.is_some()
    }

    /// Clear a recorded failure so the next page request may retry.
    ///
    /// Returns true if there was a failure to clear.
    pub fn rearm(&mut self) -> bool {
        if !self.current {
            return false;
        }
        self.failure.take().is_some()
    }

    /// True when `fetch_next_page` would return a request.
    pub fn can_fetch(&self) -> bool {
        self.current && self.in_flight.is_none() && !self.exhausted && self.failure.is_none()
    }

    /// Coarse state, for logging and status output.
    pub fn phase(&self) -> SessionPhase {
        if !self.current {
            SessionPhase::Invalidated
        } else if self.in_flight.is_some() {
            SessionPhase::Fetching
        } else if self.failure.is_some() {
            SessionPhase::Failed
        } else if self.exhausted {
            SessionPhase::Exhausted
        } else {
            SessionPhase::Idle
        }
    }

    /// Identity compared against completion tickets.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Criteria this session pages through.
    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    /// Items requested per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Next page to request.
    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Ticket of the outstanding request.
    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    /// True while a request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True once a short or final page arrived.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// False once invalidated.
    pub fn is_current(&self) -> bool {
        self.current
    }

    /// True once the first page has been delivered.
    pub fn is_past_first_page(&self) -> bool {
        !self.cursor.is_first()
    }

    /// Running total of items delivered by this session.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Total match count, if the source reported one.
    pub fn total_known(&self) -> Option<usize> {
        self.total_known
    }

    /// The unacknowledged failure, if any.
    pub fn failure(&self) -> Option<&FetchFailure> {
        self.failure.as_ref()
    }

    /// Number of failed requests over the session's lifetime.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
