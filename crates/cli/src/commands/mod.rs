//! Subcommand implementations and the wiring they share

pub mod config;
pub mod definitions;
pub mod doctor;
pub mod preview;
pub mod run;

use anyhow::{Context, Result};
use holginator_adapters::{
    definitions::JsonDefinitionsRepo,
    feed::{HttpFeedClient, RssCodec},
    store::{InMemoryStore, RedisStore},
};
use holginator_domain::{
    ComposedFeedDefinition, DefinitionsRepo, KeyValueStore, SystemClock, usecases::Pipeline,
};
use secrecy::SecretString;
use std::path::Path;
use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};

pub(crate) type FeedPipeline =
    Pipeline<HttpFeedClient, HttpFeedClient, RssCodec, dyn KeyValueStore, SystemClock>;

pub(crate) async fn load_definitions(path: &Path) -> Result<Vec<ComposedFeedDefinition>> {
    let repo =
        JsonDefinitionsRepo::new(path).context("Failed to initialize definitions repository")?;

    repo.load()
        .await
        .with_context(|| format!("Failed to load definitions from {}", path.display()))
}

/// Redis URL from the configured env var, or the configured default
pub(crate) fn store_url(config: &AppConfig) -> SecretString {
    let url = std::env::var(&config.store.url_env)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| config.store.default_url.clone());

    SecretString::new(url.into())
}

/// Store for publishing; dry runs never open a connection
pub(crate) async fn build_store(
    config: &AppConfig,
    dry_run: bool,
) -> Result<Arc<dyn KeyValueStore>> {
    if dry_run || config.store.backend == StoreBackend::Memory {
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let store = RedisStore::connect(&store_url(config))
        .await
        .context("Failed to connect to Redis")?;

    Ok(Arc::new(store))
}

pub(crate) fn build_pipeline(
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
    dry_run: bool,
) -> Result<FeedPipeline> {
    let http = Arc::new(
        HttpFeedClient::new(config.http_config()).context("Failed to build HTTP client")?,
    );

    Ok(Pipeline::new(
        Arc::clone(&http),
        http,
        Arc::new(RssCodec::new()),
        store,
        Arc::new(SystemClock),
        config.pipeline_config(dry_run),
    ))
}
