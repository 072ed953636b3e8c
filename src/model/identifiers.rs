//! Identifier and filter-value newtypes with smart constructors.
//!
//! All values validate their input at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity key of a result item.
///
/// The controller never looks inside an item beyond this key; it is what
/// keeps the displayed list ordered and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Smart constructor: validates non-empty identity key.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidItemId> {
        let raw = raw.into();
        if raw.is_empty() {
            Err(InvalidItemId::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    /// Raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ItemId {
    type Error = InvalidItemId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Opaque ruleset or category filter value (e.g. "osu", "ranked").
///
/// Stored trimmed. The controller only compares these for equality and
/// forwards them to the data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilterValue(String);

impl FilterValue {
    /// Smart constructor: trims and rejects empty or whitespace-only values.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidFilterValue> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(InvalidFilterValue::Empty)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Trimmed value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw taxonomy value.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FilterValue {
    type Error = InvalidFilterValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FilterValue> for String {
    fn from(value: FilterValue) -> Self {
        value.0
    }
}

// ===== Error Types =====

/// Error returned by `ItemId::new`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidItemId {
    /// Empty string.
    #[error("Item ID cannot be empty")]
    Empty,
}

/// Error returned by `FilterValue::new`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFilterValue {
    /// Empty or whitespace-only string.
    #[error("Filter value cannot be empty")]
    Empty,
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    // ===== ItemId Tests =====

    #[test]
    fn item_id_accepts_valid_string() {
        let id = ItemId::new("1000123");
        assert!(id.is_ok(), "Numeric-looking id should be accepted");
    }

    #[test]
    fn item_id_rejects_empty_string() {
        assert_eq!(ItemId::new(""), Err(InvalidItemId::Empty));
    }

    #[test]
    fn item_id_keeps_whitespace_verbatim() {
        let id = ItemId::new(" a ").expect("valid id");
        assert_eq!(id.as_str(), " a ");
    }

    #[test]
    fn item_id_display_matches_as_str() {
        let id = ItemId::new("set-42").unwrap();
        assert_eq!(id.to_string(), "set-42");
    }

    #[test]
    fn item_id_deserializes_from_string() {
        let id: ItemId = serde_json::from_str(r#""x1""#).unwrap();
        assert_eq!(id.as_str(), "x1");
    }

    #[test]
    fn item_id_deserialize_rejects_empty() {
        let result: Result<ItemId, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err(), "Empty id must not deserialize");
    }

    // ===== FilterValue Tests =====

    #[test]
    fn filter_value_trims_input() {
        let value = FilterValue::new("  osu ").unwrap();
        assert_eq!(value.as_str(), "osu");
    }

    #[test]
    fn filter_value_rejects_whitespace_only() {
        assert_eq!(FilterValue::new(" \t "), Err(InvalidFilterValue::Empty));
    }

    #[test]
    fn filter_value_matches_case_insensitively() {
        let value = FilterValue::new("Ranked").unwrap();
        assert!(value.matches("ranked"));
        assert!(value.matches(" RANKED "));
        assert!(!value.matches("loved"));
    }

    #[test]
    fn filter_values_compare_by_value() {
        assert_eq!(FilterValue::new("mania").unwrap(), FilterValue::new(" mania").unwrap());
    }
}
