//! Pipeline use case - orchestrates collection, composition and publishing per composed feed

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::{
    model::{ComposedFeedDefinition, FeedOutcome, RenderedFeed, SourceOutcome},
    ports::{Clock, EnclosureProbe, FeedCodec, FeedFetcher, KeyValueStore, RenderError},
    usecases::{
        collect::SourceCollector,
        compose::{ComposeConfig, FeedComposer},
        enrich::EnrichConfig,
        publish::{DEFAULT_NAMESPACE, FeedPublisher, PublishError},
    },
};

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Compose without writing to the store
    pub dry_run: bool,
    /// Maximum composed feeds processed at once
    pub max_concurrent_feeds: usize,
    /// Maximum sources fetched at once within one composed feed
    pub max_concurrent_sources: usize,
    /// Store key namespace
    pub namespace: String,
    /// Enrichment config
    pub enrich_config: EnrichConfig,
    /// Composition config
    pub compose_config: ComposeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_concurrent_feeds: 4,
            max_concurrent_sources: 4,
            namespace: DEFAULT_NAMESPACE.to_string(),
            enrich_config: EnrichConfig::default(),
            compose_config: ComposeConfig::default(),
        }
    }
}

/// A composed feed that has been rendered but not yet published
#[derive(Debug, Clone)]
pub struct ComposedFeed {
    pub rendered: RenderedFeed,
    /// URLs of sources that contributed nothing because they failed
    pub failed_sources: Vec<String>,
}

/// Errors that abort a single composed feed
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("All {count} sources failed")]
    NoSources { count: usize },
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Pipeline orchestrator
pub struct Pipeline<F, P, C, S, Cl>
where
    F: FeedFetcher + ?Sized,
    P: EnclosureProbe + ?Sized,
    C: FeedCodec + ?Sized,
    S: KeyValueStore + ?Sized,
    Cl: Clock + ?Sized,
{
    collector: SourceCollector<F, P, C>,
    composer: FeedComposer<C, Cl>,
    publisher: FeedPublisher<S>,
    config: PipelineConfig,
}

impl<F, P, C, S, Cl> Pipeline<F, P, C, S, Cl>
where
    F: FeedFetcher + ?Sized,
    P: EnclosureProbe + ?Sized,
    C: FeedCodec + ?Sized,
    S: KeyValueStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        fetcher: Arc<F>,
        probe: Arc<P>,
        codec: Arc<C>,
        store: Arc<S>,
        clock: Arc<Cl>,
        config: PipelineConfig,
    ) -> Self {
        let collector = SourceCollector::new(
            fetcher,
            probe,
            Arc::clone(&codec),
            config.enrich_config.clone(),
            config.max_concurrent_sources,
        );
        let composer = FeedComposer::new(codec, clock, config.compose_config.clone());
        let publisher = FeedPublisher::new(store, config.namespace.clone());

        Self {
            collector,
            composer,
            publisher,
            config,
        }
    }

    /// Run one pass over all definitions
    ///
    /// Results are returned in definition order. A failed definition never
    /// stops the others.
    pub async fn run_once(
        &self,
        definitions: &[ComposedFeedDefinition],
    ) -> Vec<(String, FeedOutcome)> {
        tracing::info!(
            feeds = definitions.len(),
            dry_run = self.config.dry_run,
            "Starting composition pass"
        );

        let max_concurrent = self.config.max_concurrent_feeds.max(1);
        let mut queue = definitions.iter().enumerate();
        let mut tasks = FuturesUnordered::new();
        let mut results = Vec::with_capacity(definitions.len());

        for (index, definition) in queue.by_ref().take(max_concurrent) {
            tasks.push(self.run_indexed(index, definition));
        }

        while let Some(result) = tasks.next().await {
            results.push(result);
            if let Some((index, definition)) = queue.next() {
                tasks.push(self.run_indexed(index, definition));
            }
        }

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, name, outcome)| (name, outcome))
            .collect()
    }

    async fn run_indexed(
        &self,
        index: usize,
        definition: &ComposedFeedDefinition,
    ) -> (usize, String, FeedOutcome) {
        let outcome = self.run_definition(definition).await;
        (index, definition.name.clone(), outcome)
    }

    /// Compose and publish a single definition
    pub async fn run_definition(&self, definition: &ComposedFeedDefinition) -> FeedOutcome {
        let composed = match self.compose_definition(definition).await {
            Ok(composed) => composed,
            Err(e) => {
                tracing::error!(feed = %definition.name, error = %e, "Failed to compose feed");
                return FeedOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let ComposedFeed {
            rendered,
            failed_sources,
        } = composed;

        if self.config.dry_run {
            tracing::info!(
                feed = %definition.name,
                items = rendered.item_count,
                key = %self.publisher.keys_for(&definition.name).document,
                fingerprint = %rendered.fingerprint,
                "[DRY RUN] Would publish"
            );
            return FeedOutcome::Previewed {
                item_count: rendered.item_count,
                fingerprint: rendered.fingerprint,
                failed_sources,
            };
        }

        match self.publisher.publish(&definition.name, &rendered).await {
            Ok(_) => FeedOutcome::Published {
                item_count: rendered.item_count,
                fingerprint: rendered.fingerprint,
                failed_sources,
            },
            Err(e) => {
                let error = PipelineError::from(e);
                tracing::error!(feed = %definition.name, error = %error, "Failed to publish feed");
                FeedOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    /// Collect every source of a definition and render the result without publishing
    pub async fn compose_definition(
        &self,
        definition: &ComposedFeedDefinition,
    ) -> Result<ComposedFeed, PipelineError> {
        tracing::info!(
            feed = %definition.name,
            sources = definition.sources.len(),
            "Composing feed"
        );

        let outcomes = self.collector.collect_all(&definition.sources).await;

        let mut items = Vec::new();
        let mut failed_sources = Vec::new();
        for outcome in outcomes {
            match outcome {
                SourceOutcome::Collected { url, items: source_items } => {
                    tracing::debug!(feed = %definition.name, url = %url, count = source_items.len(), "Collected source");
                    items.extend(source_items);
                }
                SourceOutcome::Failed { url, .. } => failed_sources.push(url),
            }
        }

        if !definition.sources.is_empty() && failed_sources.len() == definition.sources.len() {
            return Err(PipelineError::NoSources {
                count: failed_sources.len(),
            });
        }

        let rendered = self.composer.compose(definition, items)?;

        Ok(ComposedFeed {
            rendered,
            failed_sources,
        })
    }
}
