//! In-memory catalog data source.
//!
//! Loads catalog entries from a JSONL file (one entry per line) or generates
//! a deterministic synthetic catalog, then answers page requests by
//! filtering, sorting and slicing it.

use crate::model::error::InputError;
use crate::model::{
    FetchError, FetchedPage, ItemId, PageCursor, ResultItem, SearchCriteria, SortDirection,
    SortField,
};
use crate::source::DataSource;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;
use tracing::{debug, info};

/// One catalog line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Identity key.
    pub id: ItemId,
    /// Song title.
    pub title: String,
    /// Song artist.
    #[serde(default)]
    pub artist: String,
    /// Ruleset name, matched by the ruleset filter.
    pub ruleset: String,
    /// Listing category, matched by the category filter.
    pub category: String,
    /// Play count.
    #[serde(default)]
    pub plays: u64,
    /// Favourite count.
    #[serde(default)]
    pub favourites: u64,
    /// User rating.
    #[serde(default)]
    pub rating: f32,
    /// When the entry was ranked, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranked_at: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    fn to_item(&self) -> ResultItem {
        ResultItem::new(self.id.clone(), format!("{} - {}", self.artist, self.title))
    }

    /// Position of the query in the title, else in the artist (after the
    /// title), else `None`.
    fn match_position(&self, needle: &str) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        let title = self.title.to_lowercase();
        if let Some(pos) = title.find(needle) {
            return Some(pos);
        }
        self.artist
            .to_lowercase()
            .find(needle)
            .map(|pos| title.len() + pos)
    }
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct CatalogSource {
    entries: Vec<CatalogEntry>,
    latency: Duration,
    fail_every: Option<u64>,
    requests: AtomicU64,
}

impl CatalogSource {
    /// Catalog over `entries`, with no latency and no injected failures.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Load a JSONL catalog file.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist,
    /// `InputError::MalformedLine` for the first line that is not an entry,
    /// and `InputError::Io` for read failures.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let source = Self::from_reader(File::open(path)?)?;
        info!(path = %path.display(), entries = source.len(), "catalog loaded");
        Ok(source)
    }

    /// Parse JSONL from any reader. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogSource::from_path`], minus `FileNotFound`.
    pub fn from_reader(reader: impl Read) -> Result<Self, InputError> {
        let mut entries = Vec::new();
        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str::<CatalogEntry>(&line).map_err(|e| {
                InputError::MalformedLine {
                    line: index + 1,
                    message: e.to_string(),
                }
            })?;
            entries.push(entry);
        }
        Ok(Self::new(entries))
    }

    /// Deterministic catalog of `count` entries spread over every ruleset
    /// and category.
    pub fn synthetic(count: usize) -> Self {
        const RULESETS: [&str; 4] = ["osu", "taiko", "fruits", "mania"];
        const CATEGORIES: [&str; 5] = ["ranked", "loved", "qualified", "pending", "graveyard"];
        const ADJECTIVES: [&str; 8] = [
            "Crimson", "Silent", "Electric", "Paper", "Hollow", "Golden", "Neon", "Winter",
        ];
        const NOUNS: [&str; 8] = [
            "Skyline", "Drum", "Garden", "Signal", "Echo", "Harbor", "Lantern", "Tide",
        ];
        const ARTISTS: [&str; 6] = [
            "Camellia", "xi", "nekodex", "Kobaryo", "Feryquitous", "ginkiha",
        ];

        let epoch = Utc.timestamp_opt(1_600_000_000, 0).single();
        let entries = (0..count)
            .filter_map(|n| {
                let id = ItemId::new(format!("{}", 1000 + n)).ok()?;
                let k = n as u64;
                Some(CatalogEntry {
                    id,
                    title: format!(
                        "{} {} {}",
                        ADJECTIVES[n % ADJECTIVES.len()],
                        NOUNS[(n / ADJECTIVES.len()) % NOUNS.len()],
                        n
                    ),
                    artist: ARTISTS[(n * 7) % ARTISTS.len()].to_string(),
                    ruleset: RULESETS[n % RULESETS.len()].to_string(),
                    category: CATEGORIES[(n / 3) % CATEGORIES.len()].to_string(),
                    plays: (k * 7919) % 100_000,
                    favourites: (k * 104_729) % 5_000,
                    rating: ((n * 37) % 100) as f32 / 10.0,
                    ranked_at: epoch.map(|t| t + chrono::Duration::days(n as i64)),
                })
            })
            .collect();
        Self::new(entries)
    }

    /// Sleep this long before answering each request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every `n`th request with `FetchError::Unavailable`. Zero disables.
    pub fn with_fail_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for an empty catalog.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry matching `criteria`, in result order.
    pub fn matching(&self, criteria: &SearchCriteria) -> Vec<&CatalogEntry> {
        let needle = criteria.query().trim().to_lowercase();
        let mut hits: Vec<(&CatalogEntry, usize)> = self
            .entries
            .iter()
            .filter(|e| criteria.ruleset().is_none_or(|r| r.matches(&e.ruleset)))
            .filter(|e| criteria.category().is_none_or(|c| c.matches(&e.category)))
            .filter_map(|e| e.match_position(&needle).map(|pos| (e, pos)))
            .collect();

        hits.sort_by(|(a, a_pos), (b, b_pos)| {
            let natural = compare(criteria.sort(), a, *a_pos, b, *b_pos);
            let ordered = match criteria.direction() {
                SortDirection::Ascending => natural,
                SortDirection::Descending => natural.reverse(),
            };
            ordered.then_with(|| a.id.cmp(&b.id))
        });
        hits.into_iter().map(|(entry, _)| entry).collect()
    }
}

/// Ascending order for `field`. For relevance, ascending means least
/// relevant first: a later match position, then a later title.
fn compare(
    field: SortField,
    a: &CatalogEntry,
    a_pos: usize,
    b: &CatalogEntry,
    b_pos: usize,
) -> Ordering {
    match field {
        SortField::Relevance => b_pos
            .cmp(&a_pos)
            .then_with(|| b.title.to_lowercase().cmp(&a.title.to_lowercase())),
        SortField::Ranked => a.ranked_at.cmp(&b.ranked_at),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Artist => a.artist.to_lowercase().cmp(&b.artist.to_lowercase()),
        SortField::Plays => a.plays.cmp(&b.plays),
        SortField::Favourites => a.favourites.cmp(&b.favourites),
        SortField::Rating => a.rating.total_cmp(&b.rating),
    }
}

impl DataSource for CatalogSource {
    fn fetch_page(
        &self,
        criteria: &SearchCriteria,
        cursor: PageCursor,
        page_size: usize,
    ) -> Result<FetchedPage, FetchError> {
        let request_no = self.requests.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if page_size == 0 {
            return Err(FetchError::Malformed("page size must be positive".to_string()));
        }
        if self.fail_every.is_some_and(|n| request_no % n == 0) {
            return Err(FetchError::Unavailable(format!(
                "request {request_no} rejected by catalog"
            )));
        }

        let hits = self.matching(criteria);
        let total = hits.len();
        let start = cursor.offset(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);
        let items: Vec<ResultItem> = hits[start..end].iter().map(|e| e.to_item()).collect();

        debug!(%cursor, total, returned = items.len(), "catalog page served");
        let page = FetchedPage::new(items).with_total(total);
        Ok(if end >= total { page.ending() } else { page })
    }
}
