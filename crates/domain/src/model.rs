//! Domain models and value objects

use regex::Regex;
use serde::{Serialize, Serializer};
use time::OffsetDateTime;

use crate::compute_fingerprint;

/// A named composed feed built from one or more upstream sources
#[derive(Debug, Clone, Serialize)]
pub struct ComposedFeedDefinition {
    /// Unique name, used as cache key and as the public link suffix
    pub name: String,
    /// Channel title of the composed feed
    pub title: String,
    /// Channel description of the composed feed
    pub description: String,
    /// Channel image URL
    pub image: String,
    /// Upstream feeds, in declared order
    pub sources: Vec<SourceSpec>,
}

/// One upstream feed of a composed feed
#[derive(Debug, Clone, Serialize)]
pub struct SourceSpec {
    /// URL of the upstream feed
    pub url: String,
    /// Optional item filter; `None` keeps every item
    pub filter: Option<ItemFilter>,
}

/// A compiled, case-sensitive item pattern
///
/// Compiled once when definitions are loaded and matched against the
/// title and description of each item.
#[derive(Debug, Clone)]
pub struct ItemFilter {
    pattern: Regex,
}

impl ItemFilter {
    /// Compile a filter from its textual pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the item's title or description matches
    pub fn matches(&self, item: &Item) -> bool {
        self.pattern.is_match(&item.title)
            || item
                .description
                .as_deref()
                .is_some_and(|description| self.pattern.is_match(description))
    }
}

impl Serialize for ItemFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A media attachment of an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
    /// Length in bytes; absent on input when the upstream feed omits it
    pub length: Option<u64>,
}

/// One feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    pub description: Option<String>,
    pub published: Option<OffsetDateTime>,
    pub link: Option<String>,
    pub enclosure: Enclosure,
}

/// Channel metadata of an upstream feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChannel {
    pub title: String,
}

/// Result of parsing an upstream feed body
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub channel: SourceChannel,
    pub items: Vec<Item>,
}

/// Image block of a composed feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedImage {
    pub title: String,
    pub url: String,
}

/// Channel-level metadata of a composed feed, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedChannel {
    pub title: String,
    pub description: String,
    pub link: String,
    pub updated: OffsetDateTime,
    pub image: FeedImage,
}

/// A rendered composed feed document and its fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFeed {
    /// The feed document
    pub document: String,
    /// Hex SHA-256 of the document bytes
    pub fingerprint: String,
    /// Number of items in the document
    pub item_count: usize,
}

impl RenderedFeed {
    /// Wrap a rendered document, computing its fingerprint
    pub fn new(document: String, item_count: usize) -> Self {
        let fingerprint = compute_fingerprint(&document);
        Self {
            document,
            fingerprint,
            item_count,
        }
    }
}

/// The pair of store keys owned by one composed feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    /// Key holding the document
    pub document: String,
    /// Key holding the fingerprint
    pub fingerprint: String,
}

impl CacheKeys {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            document: format!("{}:{}", namespace, name),
            fingerprint: format!("{}:etag:{}", namespace, name),
        }
    }
}

/// Collection result for a single source
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    /// Source was fetched, parsed, filtered and enriched
    Collected { url: String, items: Vec<Item> },
    /// Source could not be fetched or parsed
    Failed { url: String, reason: String },
}

impl SourceOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Collected { url, .. } | Self::Failed { url, .. } => url,
        }
    }
}

/// Result of one pipeline pass for a single composed feed
#[derive(Debug)]
pub enum FeedOutcome {
    /// Document and fingerprint were written to the store
    Published {
        item_count: usize,
        fingerprint: String,
        failed_sources: Vec<String>,
    },
    /// Document was composed but not written (dry run)
    Previewed {
        item_count: usize,
        fingerprint: String,
        failed_sources: Vec<String>,
    },
    /// Rendering or publishing failed; previous store entries are untouched
    Failed { error: String },
}

impl FeedOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
