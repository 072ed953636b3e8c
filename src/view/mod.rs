//! Rendering collaborator boundary.
//!
//! The controller never lays anything out. It tells a `ResultView` what
//! happened, in order, and the view decides how that looks.

pub mod console;
pub mod memory;
pub mod viewport;

pub use console::ConsoleView;
pub use memory::{MemoryView, ViewCall};
pub use viewport::SimulatedViewport;

use crate::model::{FetchError, ResultItem};

/// Outbound rendering calls.
///
/// Calls arrive on the event loop thread, in the order the controller
/// decided them.
pub trait ResultView {
    /// Show that a first page is being loaded.
    fn show_loading_indicator(&mut self);

    /// Stop showing the loading indicator.
    fn hide_loading_indicator(&mut self);

    /// Replace whatever is displayed with `items`.
    ///
    /// Implementations that animate must start the outgoing transition no
    /// later than the incoming content's entry.
    fn replace_content(&mut self, items: &[ResultItem]);

    /// Append `items` after the currently displayed list.
    fn append_content(&mut self, items: &[ResultItem]);

    /// Render the "nothing found" state in place of any list.
    fn show_empty_state(&mut self);

    /// Highlight the item that heads a fresh result list, or clear the highlight.
    fn set_featured(&mut self, _item: Option<&ResultItem>) {}

    /// A first page could not be loaded.
    fn show_fetch_failure(&mut self, _error: &FetchError) {}
}
