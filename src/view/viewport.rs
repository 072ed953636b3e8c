//! Simulated scroll container for the line-oriented shell.
//!
//! The console has no real scrolling, so the shell keeps a row offset over
//! the displayed list and turns it into `ViewportMetrics` for the probe.

use crate::state::ViewportMetrics;

/// Rows visible at once when not configured.
pub const DEFAULT_VIEWPORT_ROWS: usize = 20;

/// Content units per row.
pub const DEFAULT_ROW_EXTENT: f32 = 25.0;

/// Row window over the displayed list.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedViewport {
    rows: usize,
    row_extent: f32,
    top_row: usize,
}

impl Default for SimulatedViewport {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_ROWS, DEFAULT_ROW_EXTENT)
    }
}

impl SimulatedViewport {
    /// Viewport of `rows` rows at the top of the content.
    pub fn new(rows: usize, row_extent: f32) -> Self {
        Self {
            rows: rows.max(1),
            row_extent: row_extent.max(f32::EPSILON),
            top_row: 0,
        }
    }

    /// Index of the first visible row.
    pub fn top_row(&self) -> usize {
        self.top_row
    }

    /// Scroll by `delta` rows, clamped to the content.
    pub fn scroll_by(&mut self, delta: isize, content_rows: usize) {
        let target = self.top_row.saturating_add_signed(delta);
        self.top_row = target.min(self.max_top_row(content_rows));
    }

    /// Scroll so the last row is visible.
    pub fn scroll_to_end(&mut self, content_rows: usize) {
        self.top_row = self.max_top_row(content_rows);
    }

    /// Back to the top, as after a new result list.
    pub fn reset(&mut self) {
        self.top_row = 0;
    }

    /// Geometry for the load trigger.
    pub fn metrics(&self, content_rows: usize) -> ViewportMetrics {
        let top_row = self.top_row.min(self.max_top_row(content_rows));
        ViewportMetrics::new(
            top_row as f32 * self.row_extent,
            self.rows as f32 * self.row_extent,
            content_rows as f32 * self.row_extent,
        )
    }

    fn max_top_row(&self, content_rows: usize) -> usize {
        content_rows.saturating_sub(self.rows)
    }
}
