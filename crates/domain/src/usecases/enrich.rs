//! Item enrichment: title prefixing and enclosure length resolution

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::{model::Item, ports::EnclosureProbe};

/// Length assumed for enclosures whose size cannot be determined
pub const DEFAULT_ENCLOSURE_LENGTH: u64 = 1_000_000;

/// Configuration for enrichment
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Length used when a lookup yields nothing
    pub default_enclosure_length: u64,
    /// Maximum concurrent enclosure lookups per source
    pub max_concurrent_lookups: usize,
    /// Upper bound on a single lookup
    pub lookup_timeout: Duration,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            default_enclosure_length: DEFAULT_ENCLOSURE_LENGTH,
            max_concurrent_lookups: 8,
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

/// Prefixes titles with the source channel title and fills in missing enclosure lengths
pub struct Enricher<P: ?Sized> {
    probe: Arc<P>,
    config: EnrichConfig,
}

impl<P: EnclosureProbe + ?Sized> Enricher<P> {
    pub fn new(probe: Arc<P>, config: EnrichConfig) -> Self {
        Self { probe, config }
    }

    /// Enrich every item of one source, preserving order
    pub async fn enrich(&self, items: Vec<Item>, channel_title: &str) -> Vec<Item> {
        let concurrency = self.config.max_concurrent_lookups.max(1);

        stream::iter(items)
            .map(|item| self.enrich_item(item, channel_title))
            .buffered(concurrency)
            .collect()
            .await
    }

    async fn enrich_item(&self, mut item: Item, channel_title: &str) -> Item {
        item.title = format!("{}: {}", channel_title, item.title);

        if item.enclosure.length.is_none() {
            let length = self.resolve_length(&item.enclosure.url).await;
            item.enclosure.length = Some(length);
        }

        item
    }

    /// Look up an enclosure's length, falling back to the configured default
    pub async fn resolve_length(&self, url: &str) -> u64 {
        let fallback = self.config.default_enclosure_length;

        match tokio::time::timeout(self.config.lookup_timeout, self.probe.content_length(url))
            .await
        {
            Ok(Ok(Some(length))) => length,
            Ok(Ok(None)) => {
                tracing::debug!(url = %url, fallback, "No content length advertised");
                fallback
            }
            Ok(Err(error)) => {
                tracing::debug!(url = %url, error = %error, fallback, "Enclosure lookup failed");
                fallback
            }
            Err(_) => {
                tracing::debug!(url = %url, fallback, "Enclosure lookup timed out");
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Enclosure;
    use crate::ports::EnclosureLookupError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Probe {
        Length(u64),
        Missing,
        Fail,
        Hang,
    }

    struct FakeProbe {
        responses: HashMap<String, Probe>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        fn new(responses: Vec<(&str, Probe)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(url, probe)| (url.to_string(), probe))
                    .collect(),
                calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl EnclosureProbe for FakeProbe {
        async fn content_length(&self, url: &str) -> Result<Option<u64>, EnclosureLookupError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Probe::Length(length)) => Ok(Some(*length)),
                Some(Probe::Missing) | None => Ok(None),
                Some(Probe::Fail) => Err(EnclosureLookupError::Status(404)),
                Some(Probe::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Some(1))
                }
            }
        }
    }

    fn item(title: &str, url: &str, length: Option<u64>) -> Item {
        Item {
            title: title.to_string(),
            description: None,
            published: None,
            link: None,
            enclosure: Enclosure {
                url: url.to_string(),
                mime_type: "audio/mpeg".to_string(),
                length,
            },
        }
    }

    #[tokio::test]
    async fn test_titles_are_prefixed_once() {
        let probe = Arc::new(FakeProbe::new(vec![]));
        let enricher = Enricher::new(probe, EnrichConfig::default());

        let items = vec![
            item("Episode 1", "http://cdn/1.mp3", Some(10)),
            item("Episode 2", "http://cdn/2.mp3", Some(20)),
        ];
        let result = enricher.enrich(items, "Daily Show").await;

        assert_eq!(result[0].title, "Daily Show: Episode 1");
        assert_eq!(result[1].title, "Daily Show: Episode 2");
    }

    #[tokio::test]
    async fn test_existing_length_is_kept_without_lookup() {
        let probe = Arc::new(FakeProbe::new(vec![("http://cdn/1.mp3", Probe::Length(5))]));
        let enricher = Enricher::new(Arc::clone(&probe), EnrichConfig::default());

        let result = enricher
            .enrich(vec![item("E", "http://cdn/1.mp3", Some(777))], "Feed")
            .await;

        assert_eq!(result[0].enclosure.length, Some(777));
        assert!(probe.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_lengths_are_resolved_or_defaulted() {
        let probe = Arc::new(FakeProbe::new(vec![
            ("http://cdn/found.mp3", Probe::Length(123_456)),
            ("http://cdn/missing.mp3", Probe::Missing),
            ("http://cdn/broken.mp3", Probe::Fail),
        ]));
        let enricher = Enricher::new(probe, EnrichConfig::default());

        let items = vec![
            item("A", "http://cdn/found.mp3", None),
            item("B", "http://cdn/missing.mp3", None),
            item("C", "http://cdn/broken.mp3", None),
        ];
        let result = enricher.enrich(items, "Feed").await;

        assert_eq!(result[0].enclosure.length, Some(123_456));
        assert_eq!(result[1].enclosure.length, Some(DEFAULT_ENCLOSURE_LENGTH));
        assert_eq!(result[2].enclosure.length, Some(DEFAULT_ENCLOSURE_LENGTH));
        assert_eq!(result[2].title, "Feed: C");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_falls_back_to_default() {
        let probe = Arc::new(FakeProbe::new(vec![("http://cdn/slow.mp3", Probe::Hang)]));
        let config = EnrichConfig {
            lookup_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let enricher = Enricher::new(probe, config);

        let result = enricher
            .enrich(vec![item("Slow", "http://cdn/slow.mp3", None)], "Feed")
            .await;

        assert_eq!(result[0].enclosure.length, Some(DEFAULT_ENCLOSURE_LENGTH));
    }

    #[tokio::test]
    async fn test_order_is_preserved_with_concurrency() {
        let probe = Arc::new(FakeProbe::new(vec![]));
        let config = EnrichConfig {
            max_concurrent_lookups: 3,
            ..Default::default()
        };
        let enricher = Enricher::new(probe, config);

        let items: Vec<_> = (0..10)
            .map(|n| item(&format!("E{}", n), &format!("http://cdn/{}.mp3", n), None))
            .collect();
        let result = enricher.enrich(items, "F").await;

        let titles: Vec<_> = result.iter().map(|i| i.title.clone()).collect();
        let expected: Vec<_> = (0..10).map(|n| format!("F: E{}", n)).collect();
        assert_eq!(titles, expected);
    }
}
