//! Scroll / load trigger (pure).
//!
//! Evaluated once per refresh tick: is the viewport close enough to the end
//! of the content to ask for another page? A cool-down after each appended
//! page keeps a borderline scroll position from firing a burst of requests.

use std::time::{Duration, Instant};

/// Distance from the end of content, in content units, that counts as "near the end".
pub const DEFAULT_SCROLL_THRESHOLD: f32 = 500.0;

/// Quiet period after an appended page before the probe may fire again.
pub const DEFAULT_LOAD_COOLDOWN: Duration = Duration::from_millis(1000);

/// Geometry of a scroll container at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// Current scroll offset from the top.
    pub offset: f32,
    /// Visible extent of the container.
    pub viewport_extent: f32,
    /// Total extent of the content.
    pub content_extent: f32,
}

impl ViewportMetrics {
    /// Metrics from raw geometry.
    pub fn new(offset: f32, viewport_extent: f32, content_extent: f32) -> Self {
        Self {
            offset,
            viewport_extent,
            content_extent,
        }
    }

    /// How far the content can scroll at all.
    pub fn scrollable_extent(&self) -> f32 {
        (self.content_extent - self.viewport_extent).max(0.0)
    }

    /// True when the content is taller than the viewport.
    pub fn has_overflow(&self) -> bool {
        self.scrollable_extent() > 0.0
    }

    /// Remaining scroll distance to the end of the content.
    pub fn distance_to_end(&self) -> f32 {
        (self.scrollable_extent() - self.offset).max(0.0)
    }
}

/// Decides, per refresh tick, whether the viewport asks for the next page.
#[derive(Debug, Clone)]
pub struct LoadTrigger {
    threshold: f32,
    cooldown: Duration,
    cooldown_until: Option<Instant>,
    last_offset: Option<f32>,
}

impl Default for LoadTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD, DEFAULT_LOAD_COOLDOWN)
    }
}

impl LoadTrigger {
    /// Trigger with no cool-down running. A negative threshold counts as zero.
    pub fn new(threshold: f32, cooldown: Duration) -> Self {
        Self {
            threshold: threshold.max(0.0),
            cooldown,
            cooldown_until: None,
            last_offset: None,
        }
    }

    /// Near-end distance in content units.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Scrollable overflow exists and the end is within the threshold.
    pub fn is_near_end(&self, metrics: &ViewportMetrics) -> bool {
        metrics.has_overflow() && metrics.distance_to_end() <= self.threshold
    }

    /// True until the cool-down started by `start_cooldown` ends.
    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Geometry says "load more" and no cool-down is running.
    pub fn should_request(&self, metrics: &ViewportMetrics, now: Instant) -> bool {
        self.is_near_end(metrics) && !self.is_cooling_down(now)
    }

    /// Begin the quiet period after an appended page.
    pub fn start_cooldown(&mut self, now: Instant) {
        self.cooldown_until = Some(now + self.cooldown);
    }

    /// End any running cool-down.
    pub fn clear_cooldown(&mut self) {
        self.cooldown_until = None;
    }

    /// Record the probe's offset. Returns true if it moved since the previous probe.
    pub fn observe(&mut self, metrics: &ViewportMetrics) -> bool {
        let moved = self
            .last_offset
            .is_some_and(|previous| (previous - metrics.offset).abs() > f32::EPSILON);
        self.last_offset = Some(metrics.offset);
        moved
    }

    /// Forget the cool-down and the last observed offset.
    pub fn reset(&mut self) {
        self.cooldown_until = None;
        self.last_offset = None;
    }
}
