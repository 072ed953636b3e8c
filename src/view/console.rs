//! Line-oriented `ResultView` for the terminal shell.
//!
//! Every rendering call becomes one or more plain text lines, truncated to
//! the terminal width. The output doubles as a transcript that tests can
//! snapshot.

use crate::model::{FetchError, ResultItem};
use crate::view::ResultView;
use std::borrow::Cow;
use std::io::{self, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Column budget used when the terminal width is unknown.
pub const DEFAULT_WIDTH: usize = 80;

const ELLIPSIS: char = '…';

/// Console rendering of the result list.
///
/// # Design
///
/// `ResultView` methods cannot fail, so the first write error is kept and
/// later output is dropped. The shell checks [`ConsoleView::take_error`]
/// once per loop iteration.
///
/// # Examples
///
/// ```rust
/// use scrollsearch::view::{ConsoleView, ResultView};
///
/// let mut view = ConsoleView::new(Vec::new(), 40);
/// view.show_loading_indicator();
/// view.show_empty_state();
///
/// let transcript = String::from_utf8(view.into_inner()).unwrap();
/// assert_eq!(transcript, "[loading]\n[no results]\n");
/// ```
#[derive(Debug)]
pub struct ConsoleView<W: Write> {
    out: W,
    width: usize,
    shown: usize,
    error: Option<io::Error>,
}

impl<W: Write> ConsoleView<W> {
    /// Create a view writing to `out`. A zero width falls back to
    /// [`DEFAULT_WIDTH`].
    pub fn new(out: W, width: usize) -> Self {
        Self {
            out,
            width: if width == 0 { DEFAULT_WIDTH } else { width },
            shown: 0,
            error: None,
        }
    }

    /// Write a free-form status line through the same output.
    pub fn note(&mut self, text: &str) {
        self.line(text);
    }

    /// Number of items rendered in the current list.
    pub fn shown(&self) -> usize {
        self.shown
    }

    /// The first write error since the last call, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let text = truncate_to_width(text, self.width);
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            self.error = Some(e);
        }
    }

    fn items(&mut self, items: &[ResultItem]) {
        for item in items {
            self.shown += 1;
            let row = format!("{:>4}. {}", self.shown, item.title);
            self.line(&row);
        }
    }
}

impl<W: Write> ResultView for ConsoleView<W> {
    fn show_loading_indicator(&mut self) {
        self.line("[loading]");
    }

    fn hide_loading_indicator(&mut self) {
        self.line("[loaded]");
    }

    fn replace_content(&mut self, items: &[ResultItem]) {
        self.shown = 0;
        self.line(&format!("-- {} results --", items.len()));
        self.items(items);
    }

    fn append_content(&mut self, items: &[ResultItem]) {
        self.line(&format!("-- {} more --", items.len()));
        self.items(items);
    }

    fn show_empty_state(&mut self) {
        self.shown = 0;
        self.line("[no results]");
    }

    fn set_featured(&mut self, item: Option<&ResultItem>) {
        if let Some(item) = item {
            self.line(&format!("featured: {}", item.title));
        }
    }

    fn show_fetch_failure(&mut self, error: &FetchError) {
        self.line(&format!("[search failed: {error}]"));
    }
}

/// Cut `text` to at most `width` terminal columns, marking the cut with an
/// ellipsis.
pub fn truncate_to_width(text: &str, width: usize) -> Cow<'_, str> {
    if text.width() <= width {
        return Cow::Borrowed(text);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}
