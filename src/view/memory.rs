//! In-memory `ResultView` that records every call.
//!
//! Keeps the displayed list the way a real view would, so tests and
//! benchmarks can assert on both the call sequence and the end result.

use crate::model::{FetchError, ItemId, ResultItem};
use crate::view::ResultView;

/// One recorded rendering call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    /// `show_loading_indicator`
    ShowLoading,
    /// `hide_loading_indicator`
    HideLoading,
    /// `replace_content` with these ids.
    Replace(Vec<ItemId>),
    /// `append_content` with these ids.
    Append(Vec<ItemId>),
    /// `show_empty_state`
    Empty,
    /// `set_featured`
    Featured(Option<ItemId>),
    /// `show_fetch_failure`
    Failure(FetchError),
}

/// Recording view for tests and benchmarks.
#[derive(Debug, Default, Clone)]
pub struct MemoryView {
    calls: Vec<ViewCall>,
    displayed: Vec<ResultItem>,
    loading: bool,
    empty: bool,
    featured: Option<ItemId>,
}

impl MemoryView {
    /// View with nothing shown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far, oldest first.
    pub fn calls(&self) -> &[ViewCall] {
        &self.calls
    }

    /// Return and forget the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<ViewCall> {
        std::mem::take(&mut self.calls)
    }

    /// Items in the displayed list.
    pub fn displayed(&self) -> &[ResultItem] {
        &self.displayed
    }

    /// Ids of the displayed list, for terse assertions.
    pub fn displayed_ids(&self) -> Vec<&str> {
        self.displayed.iter().map(|item| item.id.as_str()).collect()
    }

    /// True while the loading indicator is shown.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while the empty state is shown.
    pub fn is_showing_empty_state(&self) -> bool {
        self.empty
    }

    /// The featured item, if any.
    pub fn featured(&self) -> Option<&ItemId> {
        self.featured.as_ref()
    }
}

fn ids(items: &[ResultItem]) -> Vec<ItemId> {
    items.iter().map(|item| item.id.clone()).collect()
}

impl ResultView for MemoryView {
    fn show_loading_indicator(&mut self) {
        self.loading = true;
        self.calls.push(ViewCall::ShowLoading);
    }

    fn hide_loading_indicator(&mut self) {
        self.loading = false;
        self.calls.push(ViewCall::HideLoading);
    }

    fn replace_content(&mut self, items: &[ResultItem]) {
        self.empty = false;
        self.displayed = items.to_vec();
        self.calls.push(ViewCall::Replace(ids(items)));
    }

    fn append_content(&mut self, items: &[ResultItem]) {
        self.displayed.extend_from_slice(items);
        self.calls.push(ViewCall::Append(ids(items)));
    }

    fn show_empty_state(&mut self) {
        self.empty = true;
        self.displayed.clear();
        self.calls.push(ViewCall::Empty);
    }

    fn set_featured(&mut self, item: Option<&ResultItem>) {
        self.featured = item.map(|item| item.id.clone());
        self.calls.push(ViewCall::Featured(self.featured.clone()));
    }

    fn show_fetch_failure(&mut self, error: &FetchError) {
        self.calls.push(ViewCall::Failure(error.clone()));
    }
}
