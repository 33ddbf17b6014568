//! Source collection: fetch, parse, filter and enrich every source of a composed feed

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::{
    model::{Item, ParsedFeed, SourceOutcome, SourceSpec},
    ports::{EnclosureProbe, FeedCodec, FeedFetcher, SourceFetchError, SourceParseError},
    usecases::{
        enrich::{EnrichConfig, Enricher},
        filter::filter_items,
    },
};

/// Why a single source contributed nothing
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] SourceFetchError),
    #[error(transparent)]
    Parse(#[from] SourceParseError),
}

/// Drives fetch, filter and enrichment over the sources of one composed feed
pub struct SourceCollector<F: ?Sized, P: ?Sized, C: ?Sized> {
    fetcher: Arc<F>,
    codec: Arc<C>,
    enricher: Enricher<P>,
    max_concurrent_sources: usize,
}

impl<F, P, C> SourceCollector<F, P, C>
where
    F: FeedFetcher + ?Sized,
    P: EnclosureProbe + ?Sized,
    C: FeedCodec + ?Sized,
{
    pub fn new(
        fetcher: Arc<F>,
        probe: Arc<P>,
        codec: Arc<C>,
        enrich_config: EnrichConfig,
        max_concurrent_sources: usize,
    ) -> Self {
        Self {
            fetcher,
            codec,
            enricher: Enricher::new(probe, enrich_config),
            max_concurrent_sources,
        }
    }

    /// Collect all sources, one outcome per source in declared order
    pub async fn collect_all(&self, sources: &[SourceSpec]) -> Vec<SourceOutcome> {
        let concurrency = self.max_concurrent_sources.max(1);

        stream::iter(sources)
            .map(|source| self.collect_source(source))
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Collect a single source, isolating its failure
    pub async fn collect_source(&self, source: &SourceSpec) -> SourceOutcome {
        match self.fetch_source(source).await {
            Ok(parsed) => {
                let items = self.select_and_enrich(parsed, source).await;
                SourceOutcome::Collected {
                    url: source.url.clone(),
                    items,
                }
            }
            Err(error) => {
                tracing::warn!(url = %source.url, error = %error, "Skipping source");
                SourceOutcome::Failed {
                    url: source.url.clone(),
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Retrieve and parse one source feed
    pub async fn fetch_source(&self, source: &SourceSpec) -> Result<ParsedFeed, SourceError> {
        tracing::info!(url = %source.url, "Downloading feed");

        let body = self.fetcher.fetch(&source.url).await?;
        let parsed = self.codec.parse(&body)?;

        tracing::debug!(
            url = %source.url,
            channel = %parsed.channel.title,
            count = parsed.items.len(),
            "Parsed feed"
        );

        Ok(parsed)
    }

    async fn select_and_enrich(&self, parsed: ParsedFeed, source: &SourceSpec) -> Vec<Item> {
        let ParsedFeed { channel, items } = parsed;
        let selected = filter_items(items, source.filter.as_ref());
        self.enricher.enrich(selected, &channel.title).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComposedChannel, Enclosure, ItemFilter, SourceChannel};
    use crate::ports::{EnclosureLookupError, RenderError};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Serves canned bodies; the body is the channel title followed by item titles, one per line
    struct FakeFetcher {
        bodies: HashMap<String, Result<String, u16>>,
    }

    #[async_trait]
    impl FeedFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceFetchError> {
            match self.bodies.get(url) {
                Some(Ok(body)) => Ok(body.clone().into_bytes()),
                Some(Err(status)) => Err(SourceFetchError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(SourceFetchError::Network {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    struct FakeProbe;

    #[async_trait]
    impl EnclosureProbe for FakeProbe {
        async fn content_length(&self, _url: &str) -> Result<Option<u64>, EnclosureLookupError> {
            Ok(Some(2048))
        }
    }

    struct LineCodec;

    impl FeedCodec for LineCodec {
        fn parse(&self, body: &[u8]) -> Result<ParsedFeed, SourceParseError> {
            let text = std::str::from_utf8(body).map_err(|e| SourceParseError(e.to_string()))?;
            let mut lines = text.lines();
            let title = lines
                .next()
                .filter(|line| !line.is_empty())
                .ok_or_else(|| SourceParseError("empty body".to_string()))?;

            let items = lines
                .map(|line| Item {
                    title: line.to_string(),
                    description: None,
                    published: None,
                    link: None,
                    enclosure: Enclosure {
                        url: format!("http://cdn/{}.mp3", line),
                        mime_type: "audio/mpeg".to_string(),
                        length: None,
                    },
                })
                .collect();

            Ok(ParsedFeed {
                channel: SourceChannel {
                    title: title.to_string(),
                },
                items,
            })
        }

        fn render(&self, _channel: &ComposedChannel, _items: &[Item]) -> Result<String, RenderError> {
            unreachable!("collection never renders")
        }
    }

    fn collector(bodies: Vec<(&str, Result<&str, u16>)>) -> SourceCollector<FakeFetcher, FakeProbe, LineCodec> {
        let fetcher = FakeFetcher {
            bodies: bodies
                .into_iter()
                .map(|(url, body)| (url.to_string(), body.map(String::from)))
                .collect(),
        };
        SourceCollector::new(
            Arc::new(fetcher),
            Arc::new(FakeProbe),
            Arc::new(LineCodec),
            EnrichConfig::default(),
            4,
        )
    }

    fn source(url: &str, filter: Option<&str>) -> SourceSpec {
        SourceSpec {
            url: url.to_string(),
            filter: filter.map(|p| ItemFilter::new(p).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_collect_source_filters_and_enriches() {
        let collector = collector(vec![(
            "http://a/feed",
            Ok("Alpha\nInterview one\nNews two\nInterview three"),
        )]);

        let outcome = collector
            .collect_source(&source("http://a/feed", Some("Interview")))
            .await;

        let SourceOutcome::Collected { items, .. } = outcome else {
            panic!("expected collected outcome");
        };
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha: Interview one", "Alpha: Interview three"]);
        assert!(items.iter().all(|i| i.enclosure.length == Some(2048)));
    }

    #[tokio::test]
    async fn test_failing_sources_are_isolated() {
        let collector = collector(vec![
            ("http://ok/feed", Ok("Ok\nEpisode")),
            ("http://gone/feed", Err(404)),
            ("http://garbage/feed", Ok("")),
        ]);

        let outcomes = collector
            .collect_all(&[
                source("http://gone/feed", None),
                source("http://ok/feed", None),
                source("http://garbage/feed", None),
                source("http://unreachable/feed", None),
            ])
            .await;

        assert_eq!(outcomes.len(), 4);
        assert!(matches!(&outcomes[0], SourceOutcome::Failed { reason, .. } if reason.contains("404")));
        assert!(matches!(&outcomes[1], SourceOutcome::Collected { items, .. } if items.len() == 1));
        assert!(matches!(&outcomes[2], SourceOutcome::Failed { reason, .. } if reason.contains("Unparseable")));
        assert!(matches!(&outcomes[3], SourceOutcome::Failed { .. }));
        assert_eq!(outcomes[3].url(), "http://unreachable/feed");
    }

    #[tokio::test]
    async fn test_fetch_source_returns_channel_and_raw_items() {
        let collector = collector(vec![("http://a/feed", Ok("Alpha\nOne\nTwo"))]);

        let parsed = collector
            .fetch_source(&source("http://a/feed", None))
            .await
            .unwrap();

        assert_eq!(parsed.channel.title, "Alpha");
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].title, "One");
        assert_eq!(parsed.items[0].enclosure.length, None);
    }
}
