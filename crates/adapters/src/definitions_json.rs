//! JSON file definitions repository

use async_trait::async_trait;
use holginator_domain::{
    ComposedFeedDefinition, DefinitionsError, DefinitionsRepo, ItemFilter, SourceSpec,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Reads composed feed definitions from a `feeds.json` file
pub struct JsonDefinitionsRepo {
    path: PathBuf,
    name_pattern: Regex,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    composed_feeds: Vec<RawDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    name: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    feeds: Vec<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    url: String,
    #[serde(default)]
    filter: Option<String>,
}

impl JsonDefinitionsRepo {
    /// Create a repository over `path`; the file must exist
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DefinitionsError> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(DefinitionsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Feeds file not found: {}", path.display()),
            )));
        }

        let name_pattern = Regex::new(r"^[A-Za-z0-9_.-]+$")
            .map_err(|e| DefinitionsError::Validation(e.to_string()))?;

        Ok(Self { path, name_pattern })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn validate_name(&self, name: &str) -> Result<(), DefinitionsError> {
        if !self.name_pattern.is_match(name) {
            return Err(DefinitionsError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn convert(&self, raw: RawDefinition) -> Result<ComposedFeedDefinition, DefinitionsError> {
        self.validate_name(&raw.name)?;

        if raw.feeds.is_empty() {
            return Err(DefinitionsError::Validation(format!(
                "Feed '{}' has no sources",
                raw.name
            )));
        }

        let sources = raw
            .feeds
            .into_iter()
            .map(|source| convert_source(&raw.name, source))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ComposedFeedDefinition {
            name: raw.name,
            title: raw.title,
            description: raw.description,
            image: raw.image,
            sources,
        })
    }
}

fn convert_source(name: &str, raw: RawSource) -> Result<SourceSpec, DefinitionsError> {
    let url = raw.url.trim();
    if url.is_empty() {
        return Err(DefinitionsError::Validation(format!(
            "Feed '{}' has a source with an empty url",
            name
        )));
    }

    // Blank means unfiltered; anything else compiles exactly as written
    let filter = match raw.filter.as_deref() {
        None => None,
        Some(pattern) if pattern.trim().is_empty() => None,
        Some(pattern) => Some(ItemFilter::new(pattern).map_err(|e| {
            DefinitionsError::InvalidFilter {
                name: name.to_string(),
                pattern: pattern.to_string(),
                message: e.to_string(),
            }
        })?),
    };

    Ok(SourceSpec {
        url: url.to_string(),
        filter,
    })
}

#[async_trait]
impl DefinitionsRepo for JsonDefinitionsRepo {
    async fn load(&self) -> Result<Vec<ComposedFeedDefinition>, DefinitionsError> {
        let content = tokio::fs::read_to_string(&self.path).await?;

        let raw: RawFile = serde_json::from_str(&content).map_err(|e| DefinitionsError::Parse {
            file: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        if raw.composed_feeds.is_empty() {
            return Err(DefinitionsError::Empty(self.path.display().to_string()));
        }

        let mut names_seen = HashSet::new();
        let mut definitions = Vec::with_capacity(raw.composed_feeds.len());

        for raw_definition in raw.composed_feeds {
            let definition = self.convert(raw_definition)?;

            if !names_seen.insert(definition.name.clone()) {
                return Err(DefinitionsError::DuplicateName {
                    name: definition.name,
                });
            }

            definitions.push(definition);
        }

        tracing::debug!(
            path = %self.path.display(),
            count = definitions.len(),
            "Loaded composed feed definitions"
        );

        Ok(definitions)
    }

    async fn validate(&self) -> Result<(), DefinitionsError> {
        let _ = self.load().await?;
        Ok(())
    }
}
