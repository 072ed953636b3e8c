//! Search criteria value type.
//!
//! `SearchCriteria` is immutable: every builder consumes `self` and returns a
//! new value, so a session can hold the exact criteria it was created for.

use crate::model::identifiers::FilterValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ===== SortField =====

/// Field the result list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Closeness of the match to the query text.
    Relevance,
    /// Date the entry was ranked.
    Ranked,
    /// Title, alphabetically.
    Title,
    /// Artist, alphabetically.
    Artist,
    /// Play count.
    Plays,
    /// Favourite count.
    Favourites,
    /// User rating.
    Rating,
}

impl SortField {
    /// Every field, in menu order.
    pub const ALL: [SortField; 7] = [
        SortField::Relevance,
        SortField::Ranked,
        SortField::Title,
        SortField::Artist,
        SortField::Plays,
        SortField::Favourites,
        SortField::Rating,
    ];

    /// Lowercase name, as accepted by `FromStr`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Relevance => "relevance",
            SortField::Ranked => "ranked",
            SortField::Title => "title",
            SortField::Artist => "artist",
            SortField::Plays => "plays",
            SortField::Favourites => "favourites",
            SortField::Rating => "rating",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = CriteriaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == norm)
            .ok_or_else(|| CriteriaParseError::UnknownSortField(s.to_string()))
    }
}

// ===== SortDirection =====

/// Order applied to the sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Short form: `asc` or `desc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = CriteriaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(CriteriaParseError::UnknownSortDirection(s.to_string())),
        }
    }
}

/// Error parsing a sort field or direction from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaParseError {
    /// Not one of the `SortField` names.
    #[error("Unknown sort field: {0} (expected: relevance|ranked|title|artist|plays|favourites|rating)")]
    UnknownSortField(String),
    /// Neither `asc` nor `desc`.
    #[error("Unknown sort direction: {0} (expected: asc|desc)")]
    UnknownSortDirection(String),
}

// ===== SearchCriteria =====

/// The immutable filter/sort/query tuple driving a search.
///
/// Equality is by value: two criteria built from the same inputs are the
/// same search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchCriteria {
    query: String,
    ruleset: Option<FilterValue>,
    category: Option<FilterValue>,
    sort: SortField,
    direction: SortDirection,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            query: String::new(),
            ruleset: None,
            category: None,
            sort: SortField::Ranked,
            direction: SortDirection::Descending,
        }
    }
}

impl SearchCriteria {
    /// Browse criteria: empty query, no filters, ranked descending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the query text, keeping the ordering.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set or clear the ruleset filter.
    pub fn with_ruleset(mut self, ruleset: Option<FilterValue>) -> Self {
        self.ruleset = ruleset;
        self
    }

    /// Set or clear the category filter.
    pub fn with_category(mut self, category: Option<FilterValue>) -> Self {
        self.category = category;
        self
    }

    /// Set the sort field.
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort = sort;
        self
    }

    /// Set the sort direction.
    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Replace the query text and pick the ordering that suits it.
    ///
    /// A free-text search is ordered by relevance; an empty query falls back
    /// to the ranked listing. Both use descending order.
    pub fn with_query_and_default_sort(self, query: impl Into<String>) -> Self {
        let query = query.into();
        let sort = if query.trim().is_empty() {
            SortField::Ranked
        } else {
            SortField::Relevance
        };
        self.with_query(query)
            .with_sort(sort)
            .with_direction(SortDirection::Descending)
    }

    /// Raw query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Ruleset filter, `None` for any.
    pub fn ruleset(&self) -> Option<&FilterValue> {
        self.ruleset.as_ref()
    }

    /// Category filter, `None` for any.
    pub fn category(&self) -> Option<&FilterValue> {
        self.category.as_ref()
    }

    /// Field the results are ordered by.
    pub fn sort(&self) -> SortField {
        self.sort
    }

    /// Direction of the ordering.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// True when the query text has no searchable content.
    pub fn is_browse(&self) -> bool {
        self.query.trim().is_empty()
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let any = "any";
        write!(
            f,
            "query={:?} ruleset={} category={} sort={} {}",
            self.query,
            self.ruleset.as_ref().map(FilterValue::as_str).unwrap_or(any),
            self.category.as_ref().map(FilterValue::as_str).unwrap_or(any),
            self.sort,
            self.direction
        )
    }
}
