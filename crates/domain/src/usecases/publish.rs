//! Publishing use case - writes a rendered feed and its fingerprint to the store

use std::sync::Arc;

use crate::{
    model::{CacheKeys, RenderedFeed},
    ports::{KeyValueStore, StoreError},
};

/// Key namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "holginator";

/// Error writing a composed feed to the store
#[derive(Debug, thiserror::Error)]
#[error("Failed to write {key}: {source}")]
pub struct PublishError {
    pub key: String,
    #[source]
    pub source: StoreError,
}

/// Writes composed feeds under `<namespace>:<name>` and `<namespace>:etag:<name>`
pub struct FeedPublisher<S: ?Sized> {
    store: Arc<S>,
    namespace: String,
}

impl<S: KeyValueStore + ?Sized> FeedPublisher<S> {
    pub fn new(store: Arc<S>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// Keys owned by the composed feed called `name`
    pub fn keys_for(&self, name: &str) -> CacheKeys {
        CacheKeys::new(&self.namespace, name)
    }

    /// Overwrite the document and its fingerprint in one store write
    ///
    /// Document first for backends that write keys one at a time.
    pub async fn publish(&self, name: &str, feed: &RenderedFeed) -> Result<CacheKeys, PublishError> {
        let keys = self.keys_for(name);

        self.store
            .set_many(&[
                (keys.document.as_str(), feed.document.as_str()),
                (keys.fingerprint.as_str(), feed.fingerprint.as_str()),
            ])
            .await
            .map_err(|source| PublishError {
                key: keys.document.clone(),
                source,
            })?;

        tracing::info!(
            feed = %name,
            backend = self.store.backend(),
            key = %keys.document,
            fingerprint = %feed.fingerprint,
            "Published composed feed"
        );

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        entries: Mutex<BTreeMap<String, String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl KeyValueStore for FakeStore {
        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_on.as_deref() == Some(key) {
                return Err(StoreError::Command("READONLY".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
            if entries
                .iter()
                .any(|(key, _)| self.fail_on.as_deref() == Some(*key))
            {
                return Err(StoreError::Command("EXECABORT".to_string()));
            }
            let mut stored = self.entries.lock().unwrap();
            for (key, value) in entries {
                stored.insert(key.to_string(), value.to_string());
            }
            Ok(())
        }

        fn backend(&self) -> &'static str {
            "fake"
        }
    }

    #[tokio::test]
    async fn test_publish_writes_exactly_two_keys() {
        let store = Arc::new(FakeStore::default());
        let publisher = FeedPublisher::new(Arc::clone(&store), DEFAULT_NAMESPACE);
        let feed = RenderedFeed::new("<rss>news</rss>".to_string(), 0);

        let keys = publisher.publish("news", &feed).await.unwrap();

        let entries = store.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(keys.document, "holginator:news");
        assert_eq!(entries["holginator:news"], "<rss>news</rss>");
        assert_eq!(
            entries["holginator:etag:news"],
            crate::compute_fingerprint("<rss>news</rss>")
        );
    }

    #[tokio::test]
    async fn test_republishing_overwrites_with_same_fingerprint() {
        let store = Arc::new(FakeStore::default());
        let publisher = FeedPublisher::new(Arc::clone(&store), "podcasts");

        publisher
            .publish("tech", &RenderedFeed::new("<rss>v1</rss>".to_string(), 0))
            .await
            .unwrap();
        let first = store.entries.lock().unwrap()["podcasts:etag:tech"].clone();

        publisher
            .publish("tech", &RenderedFeed::new("<rss>v1</rss>".to_string(), 0))
            .await
            .unwrap();

        let entries = store.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["podcasts:etag:tech"], first);
    }

    #[tokio::test]
    async fn test_store_failure_names_key() {
        let store = Arc::new(FakeStore {
            fail_on: Some("holginator:news".to_string()),
            ..Default::default()
        });
        let publisher = FeedPublisher::new(Arc::clone(&store), DEFAULT_NAMESPACE);

        let error = publisher
            .publish("news", &RenderedFeed::new("<rss/>".to_string(), 0))
            .await
            .unwrap_err();

        assert_eq!(error.key, "holginator:news");
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fingerprint_write_keeps_previous_pair() {
        let store = Arc::new(FakeStore {
            fail_on: Some("holginator:etag:news".to_string()),
            ..Default::default()
        });
        store
            .entries
            .lock()
            .unwrap()
            .extend([
                ("holginator:news".to_string(), "<rss>old</rss>".to_string()),
                ("holginator:etag:news".to_string(), "old-etag".to_string()),
            ]);
        let publisher = FeedPublisher::new(Arc::clone(&store), DEFAULT_NAMESPACE);

        let error = publisher
            .publish("news", &RenderedFeed::new("<rss>new</rss>".to_string(), 0))
            .await
            .unwrap_err();

        assert_eq!(error.key, "holginator:news");
        let entries = store.entries.lock().unwrap();
        assert_eq!(entries["holginator:news"], "<rss>old</rss>");
        assert_eq!(entries["holginator:etag:news"], "old-etag");
    }
}
