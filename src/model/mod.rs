//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod criteria;
pub mod error;
pub mod identifiers;
pub mod page;

// Re-export for convenience
pub use criteria::{CriteriaParseError, SearchCriteria, SortDirection, SortField};
pub use error::{AppError, CommandError, FetchError, InputError};
pub use identifiers::{FilterValue, InvalidFilterValue, InvalidItemId, ItemId};
pub use page::{
    FetchRequest, FetchTicket, FetchedPage, PageCursor, ResultItem, ResultPage, SessionId,
};
