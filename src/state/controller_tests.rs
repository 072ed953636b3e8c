//! Tests for SearchController.

use super::*;
use crate::model::{PageCursor, ResultItem};
use crate::state::aggregator::DisplayState;
use crate::test_harness::{full_page, TestClock};
use crate::view::{MemoryView, ViewCall};

fn controller() -> SearchController {
    SearchController::new(ControllerConfig::default())
}

fn controller_with_page_size(page_size: usize) -> SearchController {
    SearchController::new(ControllerConfig {
        page_size,
        ..ControllerConfig::default()
    })
}

/// 800-unit viewport over 2500 units of content; near the end from offset 1200.
fn near_end(offset: f32) -> ViewportMetrics {
    ViewportMetrics::new(offset, 800.0, 2500.0)
}

fn far_from_end() -> ViewportMetrics {
    ViewportMetrics::new(0.0, 800.0, 20_000.0)
}

fn ok(request: &FetchRequest, page: FetchedPage) -> FetchCompletion {
    FetchCompletion {
        ticket: request.ticket,
        result: Ok(page),
    }
}

fn failed(request: &FetchRequest, error: FetchError) -> FetchCompletion {
    FetchCompletion {
        ticket: request.ticket,
        result: Err(error),
    }
}

fn unavailable() -> FetchError {
    FetchError::Unavailable("connection reset".to_string())
}

fn ids_of(items: &[ResultItem]) -> Vec<String> {
    items.iter().map(|item| item.id.as_str().to_string()).collect()
}

// ===== initial load =====

#[test]
fn search_now_shows_loading_and_requests_first_page() {
    let mut ctrl = controller();
    let mut view = MemoryView::new();

    let request = ctrl.search_now(&mut view).expect("initial load should fetch");

    assert_eq!(request.ticket.cursor, PageCursor::FIRST);
    assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(request.criteria, SearchCriteria::default());
    assert!(view.is_loading());
    assert_eq!(view.calls(), &[ViewCall::ShowLoading]);
    assert_eq!(ctrl.stats().sessions_started, 1);
}

#[test]
fn first_page_hides_loading_and_replaces_list() {
    let clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let request = ctrl.search_now(&mut view).unwrap();

    let outcome = ctrl.on_fetch_complete(ok(&request, full_page("m", 0, 50)), clock.now(), &mut view);

    assert_eq!(outcome, CompletionOutcome::Applied(AggregateOutcome::Replaced(50)));
    assert!(!view.is_loading());
    assert_eq!(view.displayed().len(), 50);
    assert_eq!(view.featured().map(|id| id.as_str()), Some("m0"));
}

#[test]
fn sessions_get_increasing_ids() {
    let mut ctrl = controller();
    let mut view = MemoryView::new();

    let first = ctrl.search_now(&mut view).unwrap();
    let second = ctrl.search_now(&mut view).unwrap();

    assert!(second.ticket.session > first.ticket.session);
    assert_eq!(ctrl.session().map(|s| s.id()), Some(second.ticket.session));
}

// ===== debouncing =====

#[test]
fn typing_burst_collapses_into_one_search_with_last_text() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();

    ctrl.handle_input(InputEvent::QueryChanged("d".into()), clock.now());
    clock.advance_ms(100);
    ctrl.handle_input(InputEvent::QueryChanged("dr".into()), clock.now());
    clock.advance_ms(100);
    ctrl.handle_input(InputEvent::QueryChanged("drum".into()), clock.now());

    assert!(ctrl.tick(clock.advance_ms(499), None, &mut view).is_none());
    let request = ctrl
        .tick(clock.advance_ms(1), None, &mut view)
        .expect("settled burst should search");

    assert_eq!(request.criteria.query(), "drum");
    assert_eq!(ctrl.stats().sessions_started, 1);
    assert!(ctrl.tick(clock.advance_ms(1000), None, &mut view).is_none());
    assert_eq!(ctrl.stats().sessions_started, 1, "Debounce fires once");
}

#[test]
fn filter_change_uses_short_delay() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let loved = FilterValue::new("loved").unwrap();

    ctrl.handle_input(InputEvent::CategoryChanged(Some(loved.clone())), clock.now());

    assert!(ctrl.tick(clock.advance_ms(99), None, &mut view).is_none());
    let request = ctrl.tick(clock.advance_ms(1), None, &mut view).unwrap();
    assert_eq!(request.criteria.category(), Some(&loved));
}

#[test]
fn latest_change_decides_delay() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();

    ctrl.handle_input(InputEvent::QueryChanged("x".into()), clock.now());
    clock.advance_ms(50);
    ctrl.handle_input(InputEvent::SortDirectionChanged(SortDirection::Ascending), clock.now());

    assert!(ctrl.tick(clock.advance_ms(100), None, &mut view).is_some());
}

#[test]
fn unchanged_criteria_schedules_nothing() {
    let clock = TestClock::new();
    let mut ctrl = controller();

    ctrl.handle_input(InputEvent::SortDirectionChanged(SortDirection::Descending), clock.now());
    ctrl.handle_input(InputEvent::RulesetChanged(None), clock.now());

    assert!(!ctrl.has_pending_search());
}

#[test]
fn search_now_absorbs_pending_debounce() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();

    ctrl.handle_input(InputEvent::QueryChanged("x".into()), clock.now());
    ctrl.search_now(&mut view).unwrap();

    assert!(ctrl.tick(clock.advance_ms(1000), None, &mut view).is_none());
    assert_eq!(ctrl.stats().sessions_started, 1);
}

// ===== query auto-sort =====

#[test]
fn query_text_selects_relevance_ordering() {
    let clock = TestClock::new();
    let mut ctrl = controller();

    ctrl.handle_input(InputEvent::QueryChanged("drum".into()), clock.now());

    assert_eq!(ctrl.criteria().sort(), SortField::Relevance);
    assert_eq!(ctrl.criteria().direction(), SortDirection::Descending);
}

#[test]
fn clearing_query_returns_to_ranked_ordering() {
    let clock = TestClock::new();
    let mut ctrl = controller();

    ctrl.handle_input(InputEvent::QueryChanged("drum".into()), clock.now());
    ctrl.handle_input(InputEvent::SortDirectionChanged(SortDirection::Ascending), clock.now());
    ctrl.handle_input(InputEvent::QueryChanged(String::new()), clock.now());

    assert_eq!(ctrl.criteria().sort(), SortField::Ranked);
    assert_eq!(ctrl.criteria().direction(), SortDirection::Descending);
}

#[test]
fn explicit_sort_change_is_kept() {
    let clock = TestClock::new();
    let mut ctrl = controller();

    ctrl.handle_input(InputEvent::QueryChanged("drum".into()), clock.now());
    ctrl.handle_input(InputEvent::SortFieldChanged(SortField::Plays), clock.now());

    assert_eq!(ctrl.criteria().sort(), SortField::Plays);
    assert_eq!(ctrl.criteria().query(), "drum");
}

// ===== stale completions =====

#[test]
fn input_stops_current_session_immediately() {
    let clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let request = ctrl.search_now(&mut view).unwrap();
    view.take_calls();

    ctrl.handle_input(InputEvent::QueryChanged("x".into()), clock.now());
    let outcome = ctrl.on_fetch_complete(ok(&request, full_page("old", 0, 50)), clock.now(), &mut view);

    assert_eq!(outcome, CompletionOutcome::Discarded(DiscardReason::Superseded));
    assert!(view.calls().is_empty(), "Stale page must not reach the view");
    assert_eq!(ctrl.stats().completions_discarded, 1);
}

#[test]
fn late_completion_of_replaced_session_is_discarded() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();

    let old = ctrl.search_now(&mut view).unwrap();
    ctrl.handle_input(InputEvent::QueryChanged("new".into()), clock.now());
    let new = ctrl.tick(clock.advance_ms(500), None, &mut view).unwrap();
    view.take_calls();

    // The new session answers first, then the old one trickles in.
    let applied = ctrl.on_fetch_complete(ok(&new, full_page("n", 0, 3)), clock.now(), &mut view);
    let discarded = ctrl.on_fetch_complete(ok(&old, full_page("o", 0, 50)), clock.now(), &mut view);

    assert_eq!(applied, CompletionOutcome::Applied(AggregateOutcome::Replaced(3)));
    assert_eq!(discarded, CompletionOutcome::Discarded(DiscardReason::Superseded));
    assert_eq!(view.displayed_ids(), vec!["n0", "n1", "n2"]);
}

#[test]
fn completion_with_unexpected_cursor_is_discarded() {
    let clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let request = ctrl.search_now(&mut view).unwrap();

    let forged = FetchCompletion {
        ticket: FetchTicket {
            session: request.ticket.session,
            cursor: PageCursor::new(3),
        },
        result: Ok(full_page("x", 0, 50)),
    };

    assert_eq!(
        ctrl.on_fetch_complete(forged, clock.now(), &mut view),
        CompletionOutcome::Discarded(DiscardReason::UnexpectedTicket)
    );
    assert!(ctrl.session().is_some_and(|s| s.is_in_flight()));
}

// ===== scroll-driven pagination =====

#[test]
fn browse_scenario_pages_until_short_page() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();

    let page0 = ctrl.search_now(&mut view).unwrap();
    assert_eq!(page0.criteria.sort(), SortField::Ranked);
    assert_eq!(page0.criteria.direction(), SortDirection::Descending);
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 50)), clock.now(), &mut view);
    assert_eq!(view.displayed().len(), 50);

    let page1 = ctrl
        .tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view)
        .expect("scrolling near the end should fetch page 1");
    assert_eq!(page1.ticket.cursor, PageCursor::new(1));

    ctrl.on_fetch_complete(ok(&page1, full_page("m", 50, 20)), clock.now(), &mut view);
    assert_eq!(view.displayed().len(), 70);
    assert!(ctrl.session().is_some_and(|s| s.is_exhausted()));

    for offset in [1600.0, 1700.0, 1800.0] {
        assert!(ctrl
            .tick(clock.advance_ms(2000), Some(&near_end(offset)), &mut view)
            .is_none());
    }
    assert_eq!(ids_of(&view.displayed()[48..52]), vec!["m48", "m49", "m50", "m51"]);
}

#[test]
fn probe_far_from_end_requests_nothing() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 50)), clock.now(), &mut view);

    assert!(ctrl
        .tick(clock.advance_ms(16), Some(&far_from_end()), &mut view)
        .is_none());
}

#[test]
fn tick_without_metrics_requests_nothing() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 50)), clock.now(), &mut view);

    assert!(ctrl.tick(clock.advance_ms(16), None, &mut view).is_none());
}

#[test]
fn probe_never_overlaps_requests() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 50)), clock.now(), &mut view);

    assert!(ctrl.tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view).is_some());
    for _ in 0..10 {
        assert!(
            ctrl.tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view)
                .is_none(),
            "Only one request per session may be outstanding"
        );
    }
}

#[test]
fn probe_waits_while_first_page_is_outstanding() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    ctrl.search_now(&mut view).unwrap();

    assert!(ctrl.tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view).is_none());
}

#[test]
fn cooldown_follows_each_appended_page() {
    let mut clock = TestClock::new();
    let mut ctrl = controller_with_page_size(2);
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 2)), clock.now(), &mut view);
    let page1 = ctrl.tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page1, full_page("m", 2, 2)), clock.now(), &mut view);

    assert!(ctrl
        .tick(clock.advance_ms(999), Some(&near_end(1500.0)), &mut view)
        .is_none());
    let page2 = ctrl
        .tick(clock.advance_ms(1), Some(&near_end(1500.0)), &mut view)
        .expect("cool-down has expired");
    assert_eq!(page2.ticket.cursor, PageCursor::new(2));
}

#[test]
fn new_session_clears_cooldown() {
    let mut clock = TestClock::new();
    let mut ctrl = controller_with_page_size(2);
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 2)), clock.now(), &mut view);
    let page1 = ctrl.tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page1, full_page("m", 2, 2)), clock.now(), &mut view);

    let fresh = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&fresh, full_page("f", 0, 2)), clock.now(), &mut view);

    assert!(ctrl
        .tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view)
        .is_some());
}

// ===== empty results =====

#[test]
fn empty_first_page_shows_empty_state_and_stops() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();

    let outcome = ctrl.on_fetch_complete(ok(&page0, FetchedPage::default()), clock.now(), &mut view);

    assert_eq!(outcome, CompletionOutcome::Applied(AggregateOutcome::ShowedEmpty));
    assert!(view.is_showing_empty_state());
    assert!(!view.is_loading());
    assert_eq!(ctrl.aggregator().state(), DisplayState::Empty);
    assert!(ctrl
        .tick(clock.advance_ms(2000), Some(&near_end(1500.0)), &mut view)
        .is_none());
}

// ===== failures =====

#[test]
fn first_page_failure_hides_loading_and_reports() {
    let clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();

    let outcome = ctrl.on_fetch_complete(failed(&page0, unavailable()), clock.now(), &mut view);

    assert_eq!(outcome, CompletionOutcome::Failed(unavailable()));
    assert_eq!(
        view.calls(),
        &[
            ViewCall::ShowLoading,
            ViewCall::HideLoading,
            ViewCall::Failure(unavailable()),
        ]
    );
    assert_eq!(ctrl.stats().failures, 1);
}

#[test]
fn failed_page_is_not_retried_from_stationary_viewport() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 50)), clock.now(), &mut view);
    let page1 = ctrl.tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view).unwrap();
    view.take_calls();

    ctrl.on_fetch_complete(failed(&page1, FetchError::TimedOut { elapsed_ms: 30_000 }), clock.now(), &mut view);

    assert!(view.calls().is_empty(), "Continuation failure leaves the list alone");
    assert_eq!(ctrl.session().map(|s| s.phase()), Some(SessionPhase::Failed));
    for _ in 0..5 {
        assert!(ctrl
            .tick(clock.advance_ms(2000), Some(&near_end(1500.0)), &mut view)
            .is_none());
    }
}

#[test]
fn scrolling_retries_the_failed_page() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 50)), clock.now(), &mut view);
    let page1 = ctrl.tick(clock.advance_ms(16), Some(&near_end(1500.0)), &mut view).unwrap();
    ctrl.on_fetch_complete(failed(&page1, unavailable()), clock.now(), &mut view);

    let retry = ctrl
        .tick(clock.advance_ms(16), Some(&near_end(1510.0)), &mut view)
        .expect("moving the viewport re-arms the session");

    assert_eq!(retry.ticket, page1.ticket);
}

#[test]
fn criteria_change_recovers_from_failure() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(failed(&page0, unavailable()), clock.now(), &mut view);

    ctrl.handle_input(InputEvent::QueryChanged("again".into()), clock.now());
    let request = ctrl.tick(clock.advance_ms(500), None, &mut view).unwrap();

    assert!(request.ticket.session > page0.ticket.session);
    assert_eq!(request.ticket.cursor, PageCursor::FIRST);
}

// ===== visibility =====

#[test]
fn search_fired_while_hidden_runs_when_shown() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    ctrl.set_visible(false);

    ctrl.handle_input(InputEvent::QueryChanged("later".into()), clock.now());
    assert!(ctrl.tick(clock.advance_ms(500), None, &mut view).is_none());
    assert!(ctrl.has_pending_search());
    assert!(view.calls().is_empty());

    ctrl.set_visible(true);
    let request = ctrl.tick(clock.advance_ms(16), None, &mut view).unwrap();

    assert_eq!(request.criteria.query(), "later");
    assert!(!ctrl.has_pending_search());
}

#[test]
fn typing_after_show_waits_for_debounce_instead_of_deferred_search() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    ctrl.set_visible(false);
    ctrl.handle_input(InputEvent::QueryChanged("a".into()), clock.now());
    assert!(ctrl.tick(clock.advance_ms(500), None, &mut view).is_none());

    ctrl.set_visible(true);
    ctrl.handle_input(InputEvent::QueryChanged("ab".into()), clock.now());

    assert!(
        ctrl.tick(clock.advance_ms(16), None, &mut view).is_none(),
        "search started before the debounce settled"
    );
    let request = ctrl.tick(clock.advance_ms(500), None, &mut view).unwrap();
    assert_eq!(request.criteria.query(), "ab");
    assert!(ctrl.tick(clock.advance_ms(500), None, &mut view).is_none());
    assert_eq!(ctrl.stats().sessions_started, 1);
}

#[test]
fn search_now_while_hidden_is_deferred() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    ctrl.set_visible(false);

    assert!(ctrl.search_now(&mut view).is_none());
    ctrl.set_visible(true);

    assert!(ctrl.tick(clock.advance_ms(16), None, &mut view).is_some());
}

// ===== dispose =====

#[test]
fn dispose_cancels_everything() {
    let mut clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.handle_input(InputEvent::QueryChanged("pending".into()), clock.now());

    ctrl.dispose(&mut view);
    view.take_calls();

    assert!(ctrl.is_disposed());
    assert!(!ctrl.has_pending_search());
    assert!(ctrl.tick(clock.advance_ms(1000), Some(&near_end(1500.0)), &mut view).is_none());
    assert_eq!(
        ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 50)), clock.now(), &mut view),
        CompletionOutcome::Discarded(DiscardReason::Superseded)
    );
    assert!(view.calls().is_empty());
}

#[test]
fn dispose_hides_outstanding_loading_indicator() {
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    ctrl.search_now(&mut view).unwrap();

    ctrl.dispose(&mut view);

    assert!(!view.is_loading());
}

#[test]
fn dispose_hides_loading_of_retired_first_page() {
    let clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    ctrl.search_now(&mut view).unwrap();
    ctrl.handle_input(InputEvent::QueryChanged("x".into()), clock.now());
    assert!(view.is_loading());

    ctrl.dispose(&mut view);

    assert!(!view.is_loading());
}

#[test]
fn dispose_after_first_page_leaves_indicator_alone() {
    let clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    let page0 = ctrl.search_now(&mut view).unwrap();
    ctrl.on_fetch_complete(ok(&page0, full_page("m", 0, 50)), clock.now(), &mut view);
    view.take_calls();

    ctrl.dispose(&mut view);

    assert!(view.calls().is_empty());
}

#[test]
fn input_after_dispose_is_ignored() {
    let clock = TestClock::new();
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    ctrl.dispose(&mut view);

    ctrl.handle_input(InputEvent::QueryChanged("ignored".into()), clock.now());

    assert_eq!(ctrl.criteria().query(), "");
    assert!(ctrl.search_now(&mut view).is_none());
}

#[test]
fn dispose_twice_is_harmless() {
    let mut ctrl = controller();
    let mut view = MemoryView::new();
    ctrl.dispose(&mut view);
    ctrl.dispose(&mut view);
    assert!(view.calls().is_empty());
}
