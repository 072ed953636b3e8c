//! Result aggregator (pure).
//!
//! Decides whether an accepted page replaces the displayed list, extends it,
//! or turns into the empty state, and forwards that decision to the view.

use crate::model::{ItemId, ResultItem, ResultPage};
use crate::view::ResultView;
use std::collections::HashSet;
use tracing::{debug, trace};

/// What the view is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// No content yet, or content was torn down.
    Nothing,
    /// The "nothing found" state.
    Empty,
    /// A result list.
    List,
}

/// What `apply` did with a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOutcome {
    /// The list was replaced with this many items.
    Replaced(usize),
    /// Items were appended to the list.
    Appended {
        /// Items new to the list.
        added: usize,
        /// Items dropped because they were already displayed.
        skipped: usize,
    },
    /// The empty state was rendered.
    ShowedEmpty,
    /// A continuation page arrived with no list to extend.
    Ignored,
}

/// Tracks the displayed list and turns accepted pages into view calls.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    state: DisplayState,
    displayed: Vec<ItemId>,
    seen: HashSet<ItemId>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    /// Aggregator with nothing displayed.
    pub fn new() -> Self {
        Self {
            state: DisplayState::Nothing,
            displayed: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Render `page`: a first page replaces the list or shows the empty state,
    /// later pages extend it.
    pub fn apply(&mut self, page: ResultPage, view: &mut dyn ResultView) -> AggregateOutcome {
        if page.first {
            self.apply_first(page.items, view)
        } else {
            self.apply_continuation(page.items, view)
        }
    }

    fn apply_first(&mut self, items: Vec<ResultItem>, view: &mut dyn ResultView) -> AggregateOutcome {
        self.displayed.clear();
        self.seen.clear();

        if items.is_empty() {
            self.state = DisplayState::Empty;
            view.hide_loading_indicator();
            view.show_empty_state();
            view.set_featured(None);
            debug!("first page empty, showing empty state");
            return AggregateOutcome::ShowedEmpty;
        }

        let items = self.admit(items);
        self.state = DisplayState::List;
        view.hide_loading_indicator();
        view.replace_content(&items);
        view.set_featured(items.first());
        debug!(count = items.len(), "list replaced");
        AggregateOutcome::Replaced(items.len())
    }

    fn apply_continuation(
        &mut self,
        items: Vec<ResultItem>,
        view: &mut dyn ResultView,
    ) -> AggregateOutcome {
        if self.state != DisplayState::List {
            trace!(state = ?self.state, "continuation page without a list, ignored");
            return AggregateOutcome::Ignored;
        }

        let offered = items.len();
        let items = self.admit(items);
        let skipped = offered - items.len();
        if skipped > 0 {
            debug!(skipped, "duplicate items dropped from continuation page");
        }
        if !items.is_empty() {
            view.append_content(&items);
        }
        AggregateOutcome::Appended {
            added: items.len(),
            skipped,
        }
    }

    /// Keep the items whose identity key is not displayed yet, in order.
    fn admit(&mut self, items: Vec<ResultItem>) -> Vec<ResultItem> {
        items
            .into_iter()
            .filter(|item| {
                if self.seen.insert(item.id.clone()) {
                    self.displayed.push(item.id.clone());
                    true
                } else {
                    false
                }
            })
            .collect()
    }

    /// Forget the displayed list without touching the view.
    pub fn clear(&mut self) {
        self.state = DisplayState::Nothing;
        self.displayed.clear();
        self.seen.clear();
    }

    /// What the view is showing.
    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// Identity keys of the displayed list, in display order.
    pub fn displayed(&self) -> &[ItemId] {
        &self.displayed
    }

    /// Number of displayed items.
    pub fn len(&self) -> usize {
        self.displayed.len()
    }

    /// True when no item is displayed.
    pub fn is_empty(&self) -> bool {
        self.displayed.is_empty()
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
