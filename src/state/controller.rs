//! Search controller (pure).
//!
//! Owns the live criteria, the debouncer, the current pagination session,
//! the aggregator and the load trigger, and is the only place where they
//! are torn down or replaced. Every transition is a `&mut self` call that
//! finishes before the next event is looked at, so teardown and
//! replacement are atomic with respect to other events.
//!
//! The controller performs no I/O: page requests come back as
//! `FetchRequest` values for the shell to run, and completions are fed back
//! through `on_fetch_complete`.

use crate::model::{
    FetchError, FetchRequest, FetchTicket, FetchedPage, FilterValue, SearchCriteria, SessionId,
    SortDirection, SortField,
};
use crate::state::aggregator::{AggregateOutcome, ResultAggregator};
use crate::state::debounce::{ChangeSource, DebounceDelays, QueryDebouncer};
use crate::state::scroll_trigger::{
    LoadTrigger, ViewportMetrics, DEFAULT_LOAD_COOLDOWN, DEFAULT_SCROLL_THRESHOLD,
};
use crate::state::session::{DiscardReason, PageOutcome, PaginationSession, SessionPhase};
use crate::view::ResultView;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Items requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Tunables for one controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Items requested per page. Must be non-zero.
    pub page_size: usize,
    /// Debounce delay per change class.
    pub delays: DebounceDelays,
    /// Distance to the end, in content units, at which the next page loads.
    pub scroll_threshold: f32,
    /// Quiet period after a continuation page before another may load.
    pub load_cooldown: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            delays: DebounceDelays::default(),
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            load_cooldown: DEFAULT_LOAD_COOLDOWN,
        }
    }
}

/// A user-driven change to one criteria field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Search text edited. Also resets the ordering.
    QueryChanged(String),
    /// Ruleset filter set, or cleared with `None`.
    RulesetChanged(Option<FilterValue>),
    /// Category filter set, or cleared with `None`.
    CategoryChanged(Option<FilterValue>),
    /// Sort field picked.
    SortFieldChanged(SortField),
    /// Sort direction flipped.
    SortDirectionChanged(SortDirection),
}

impl InputEvent {
    /// The change class, which picks the debounce delay.
    pub fn source(&self) -> ChangeSource {
        match self {
            InputEvent::QueryChanged(_) => ChangeSource::QueryText,
            InputEvent::RulesetChanged(_) => ChangeSource::Ruleset,
            InputEvent::CategoryChanged(_) => ChangeSource::Category,
            InputEvent::SortFieldChanged(_) => ChangeSource::SortField,
            InputEvent::SortDirectionChanged(_) => ChangeSource::SortDirection,
        }
    }

    /// The criteria after this change.
    ///
    /// Editing the query text also resets the ordering to the one that
    /// suits the new text.
    fn apply_to(self, criteria: &SearchCriteria) -> SearchCriteria {
        let criteria = criteria.clone();
        match self {
            InputEvent::QueryChanged(query) => criteria.with_query_and_default_sort(query),
            InputEvent::RulesetChanged(ruleset) => criteria.with_ruleset(ruleset),
            InputEvent::CategoryChanged(category) => criteria.with_category(category),
            InputEvent::SortFieldChanged(sort) => criteria.with_sort(sort),
            InputEvent::SortDirectionChanged(direction) => criteria.with_direction(direction),
        }
    }
}

/// The asynchronous result of a `FetchRequest`, delivered back to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCompletion {
    /// Ticket of the request this answers.
    pub ticket: FetchTicket,
    /// Page or error from the data source.
    pub result: Result<FetchedPage, FetchError>,
}

/// What the controller did with a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The page reached the view.
    Applied(AggregateOutcome),
    /// The request failed; the session waits for a retry.
    Failed(FetchError),
    /// The completion was stale and nothing was rendered.
    Discarded(DiscardReason),
}

/// Running counters, reported by the shell's `status` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Sessions started, debounced or immediate.
    pub sessions_started: u64,
    /// Pages handed to the aggregator.
    pub pages_delivered: u64,
    /// Completions dropped as stale.
    pub completions_discarded: u64,
    /// Page requests that failed.
    pub failures: u64,
}

/// Turns criteria edits and scroll probes into page requests, and page
/// completions into view calls.
#[derive(Debug)]
pub struct SearchController {
    config: ControllerConfig,
    criteria: SearchCriteria,
    debouncer: QueryDebouncer,
    session: Option<PaginationSession>,
    generation: u64,
    aggregator: ResultAggregator,
    trigger: LoadTrigger,
    visible: bool,
    search_deferred: bool,
    loading_shown: bool,
    disposed: bool,
    stats: ControllerStats,
}

impl SearchController {
    /// Controller over default (browse) criteria.
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_criteria(config, SearchCriteria::default())
    }

    /// Controller starting from `criteria`.
    pub fn with_criteria(config: ControllerConfig, criteria: SearchCriteria) -> Self {
        Self {
            config,
            criteria,
            debouncer: QueryDebouncer::new(config.delays),
            session: None,
            generation: 0,
            aggregator: ResultAggregator::new(),
            trigger: LoadTrigger::new(config.scroll_threshold, config.load_cooldown),
            visible: true,
            search_deferred: false,
            loading_shown: false,
            disposed: false,
            stats: ControllerStats::default(),
        }
    }

    /// Apply a criteria change and (re)schedule the search.
    ///
    /// The current session stops issuing requests immediately; its
    /// outstanding completion, if any, will be discarded. A change that
    /// leaves the criteria as they were is ignored.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        if self.disposed {
            trace!(?event, "input after dispose ignored");
            return;
        }

        let source = event.source();
        let next = event.apply_to(&self.criteria);
        if next == self.criteria {
            trace!(?source, "criteria unchanged");
            return;
        }
        self.criteria = next;

        self.retire_session();
        self.trigger.clear_cooldown();
        let due = self.debouncer.notify(source, now);
        // The debounce now covers any search deferred while hidden.
        self.search_deferred = false;
        debug!(
            ?source,
            criteria = %self.criteria,
            delay_ms = due.saturating_duration_since(now).as_millis() as u64,
            "criteria changed"
        );
    }

    /// Advance timers and run the scroll probe.
    ///
    /// A settled debounce starts a new session and returns its first-page
    /// request. Otherwise, when `metrics` is given, the probe may return the
    /// next page request of the current session.
    pub fn tick(
        &mut self,
        now: Instant,
        metrics: Option<&ViewportMetrics>,
        view: &mut dyn ResultView,
    ) -> Option<FetchRequest> {
        if self.disposed {
            return None;
        }

        if let Some(source) = self.debouncer.poll(now) {
            debug!(?source, "debounce settled");
            if !self.visible {
                debug!("view hidden, search deferred");
                self.search_deferred = true;
                return None;
            }
            return self.start_session(view);
        }

        if !self.visible {
            return None;
        }
        if self.search_deferred {
            self.search_deferred = false;
            return self.start_session(view);
        }

        self.probe(metrics?, now)
    }

    fn probe(&mut self, metrics: &ViewportMetrics, now: Instant) -> Option<FetchRequest> {
        let moved = self.trigger.observe(metrics);
        let session = self.session.as_mut()?;

        if moved && session.phase() == SessionPhase::Failed && session.rearm() {
            debug!(session = %session.id(), "failed session re-armed by scroll");
        }
        if !self.trigger.should_request(metrics, now) {
            return None;
        }

        let request = session.fetch_next_page();
        if let Some(request) = &request {
            trace!(
                ticket = %request.ticket,
                distance = metrics.distance_to_end(),
                "near end, next page requested"
            );
        }
        request
    }

    /// Route a completion through the session gate into the aggregator.
    pub fn on_fetch_complete(
        &mut self,
        completion: FetchCompletion,
        now: Instant,
        view: &mut dyn ResultView,
    ) -> CompletionOutcome {
        let FetchCompletion { ticket, result } = completion;

        let session = match self.session.as_mut() {
            Some(session) if !self.disposed && session.id() == ticket.session => session,
            _ => {
                debug!(%ticket, "completion for a retired session discarded");
                self.stats.completions_discarded += 1;
                return CompletionOutcome::Discarded(DiscardReason::Superseded);
            }
        };

        match session.complete(ticket, result) {
            PageOutcome::Delivered(page) => {
                self.stats.pages_delivered += 1;
                let first = page.first;
                if first {
                    self.loading_shown = false;
                }
                let outcome = self.aggregator.apply(page, view);
                if !first {
                    self.trigger.start_cooldown(now);
                }
                CompletionOutcome::Applied(outcome)
            }
            PageOutcome::Failed(error) => {
                self.stats.failures += 1;
                if ticket.cursor.is_first() {
                    self.loading_shown = false;
                    view.hide_loading_indicator();
                    view.show_fetch_failure(&error);
                }
                CompletionOutcome::Failed(error)
            }
            PageOutcome::Discarded(reason) => {
                self.stats.completions_discarded += 1;
                CompletionOutcome::Discarded(reason)
            }
        }
    }

    /// Start a session for the current criteria right away.
    ///
    /// Used for the initial load. A pending debounce is folded into this
    /// search. While hidden the search is deferred until shown.
    pub fn search_now(&mut self, view: &mut dyn ResultView) -> Option<FetchRequest> {
        if self.disposed {
            return None;
        }
        self.debouncer.cancel();
        if !self.visible {
            self.search_deferred = true;
            return None;
        }
        self.start_session(view)
    }

    /// Show or hide the view. A search deferred while hidden runs on the
    /// next tick after the view is shown again.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            debug!(visible, "visibility changed");
        }
        self.visible = visible;
    }

    /// Tear down the controller. Later events and completions are ignored.
    pub fn dispose(&mut self, view: &mut dyn ResultView) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.debouncer.cancel();
        self.search_deferred = false;
        self.retire_session();
        self.trigger.reset();
        if std::mem::take(&mut self.loading_shown) {
            view.hide_loading_indicator();
        }
        info!(stats = ?self.stats, "search controller disposed");
    }

    fn start_session(&mut self, view: &mut dyn ResultView) -> Option<FetchRequest> {
        self.retire_session();
        self.trigger.clear_cooldown();

        self.generation += 1;
        let id = SessionId::new(self.generation);
        let mut session = PaginationSession::new(id, self.criteria.clone(), self.config.page_size);

        view.show_loading_indicator();
        self.loading_shown = true;
        let request = session.fetch_next_page();
        self.session = Some(session);
        self.stats.sessions_started += 1;
        info!(session = %id, criteria = %self.criteria, "search started");
        request
    }

    fn retire_session(&mut self) {
        if let Some(session) = self.session.as_mut().filter(|s| s.is_current()) {
            let outstanding = session.invalidate();
            debug!(session = %session.id(), outstanding, "session invalidated");
        }
    }

    /// Tunables this controller was built with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Live criteria, including edits not yet searched.
    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    /// The most recent session, current or retired.
    pub fn session(&self) -> Option<&PaginationSession> {
        self.session.as_ref()
    }

    /// What is currently displayed.
    pub fn aggregator(&self) -> &ResultAggregator {
        &self.aggregator
    }

    /// Running counters.
    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    /// Whether the view is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether `dispose` has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// A search is scheduled or deferred but has not started yet.
    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending() || self.search_deferred
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
