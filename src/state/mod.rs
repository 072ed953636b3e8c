//! Search state machines (pure).
//!
//! All state transitions are pure functions of their inputs and an injected
//! `Instant`, testable without threads or a terminal.

pub mod aggregator;
pub mod controller;
pub mod debounce;
pub mod scroll_trigger;
pub mod session;

// Re-export for convenience
pub use aggregator::{AggregateOutcome, DisplayState, ResultAggregator};
pub use controller::{
    CompletionOutcome, ControllerConfig, ControllerStats, FetchCompletion, InputEvent,
    SearchController, DEFAULT_PAGE_SIZE,
};
pub use debounce::{ChangeSource, DebounceDelays, QueryDebouncer};
pub use scroll_trigger::{LoadTrigger, ViewportMetrics};
pub use session::{DiscardReason, FetchFailure, PageOutcome, PaginationSession, SessionPhase};
