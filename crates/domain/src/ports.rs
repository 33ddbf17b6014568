//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{ComposedChannel, ComposedFeedDefinition, Item, ParsedFeed};

/// Error type for fetching a source feed body
#[derive(Debug, Error)]
pub enum SourceFetchError {
    #[error("Timed out fetching {url}")]
    Timeout { url: String },
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
}

/// Port for retrieving raw source feed bodies
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// GET the feed at `url` and return its body
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceFetchError>;
}

/// Error type for enclosure length lookups
#[derive(Debug, Error)]
pub enum EnclosureLookupError {
    #[error("Timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
}

/// Port for resolving an enclosure's byte length without downloading it
#[async_trait]
pub trait EnclosureProbe: Send + Sync {
    /// Header-only request; `Ok(None)` when no usable length is advertised
    async fn content_length(&self, url: &str) -> Result<Option<u64>, EnclosureLookupError>;
}

/// Error type for unparseable feed bodies
#[derive(Debug, Error)]
#[error("Unparseable feed: {0}")]
pub struct SourceParseError(pub String);

/// Error type for rendering a composed feed
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid channel data: {0}")]
    Format(String),
    #[error("Failed to serialize document: {0}")]
    Serialize(String),
}

/// Port for the syndication-feed parser and renderer
pub trait FeedCodec: Send + Sync {
    /// Parse a feed body, tolerating non-conformant markup
    fn parse(&self, body: &[u8]) -> Result<ParsedFeed, SourceParseError>;

    /// Render channel metadata and items, in the given order, into one document
    fn render(&self, channel: &ComposedChannel, items: &[Item]) -> Result<String, RenderError>;
}

/// Error type for key-value store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Command failed: {0}")]
    Command(String),
}

/// Port for the key-value store that serves composed feeds
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Unconditionally overwrite `key` with `value`
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Overwrite several keys; backends that can should apply them atomically
    ///
    /// The default writes one key at a time in order and stops at the first error.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }

    /// Backend name for logging (e.g., "redis", "memory")
    fn backend(&self) -> &'static str;
}

/// Error type for the composed feed definitions repository
#[derive(Debug, Error)]
pub enum DefinitionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("No composed feeds defined in {0}")]
    Empty(String),
    #[error("Duplicate feed name '{name}'")]
    DuplicateName { name: String },
    #[error("Invalid feed name '{name}': must match [A-Za-z0-9_.-]+")]
    InvalidName { name: String },
    #[error("Invalid filter '{pattern}' in feed '{name}': {message}")]
    InvalidFilter {
        name: String,
        pattern: String,
        message: String,
    },
}

/// Port for loading composed feed definitions
#[async_trait]
pub trait DefinitionsRepo: Send + Sync {
    /// Load and validate all definitions
    async fn load(&self) -> Result<Vec<ComposedFeedDefinition>, DefinitionsError>;

    /// Validate definitions without keeping them
    async fn validate(&self) -> Result<(), DefinitionsError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
