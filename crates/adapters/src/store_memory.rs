//! In-memory key-value store for testing and dry environments

use async_trait::async_trait;
use holginator_domain::{KeyValueStore, StoreError};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory key-value store implementation
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`, if any
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Command(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Command(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Command(e.to_string()))?;
        for (key, value) in pairs {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());

        store.set("holginator:news", "<rss/>").await.unwrap();

        assert_eq!(
            store.get("holginator:news").unwrap().as_deref(),
            Some("<rss/>")
        );
        assert_eq!(store.get("holginator:other").unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = InMemoryStore::new();

        store.set("holginator:etag:news", "aaa").await.unwrap();
        store.set("holginator:etag:news", "bbb").await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("holginator:etag:news").unwrap().as_deref(),
            Some("bbb")
        );
    }

    #[tokio::test]
    async fn test_set_many_writes_every_pair() {
        let store = InMemoryStore::new();

        store
            .set_many(&[
                ("holginator:news", "<rss/>"),
                ("holginator:etag:news", "abc"),
            ])
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get("holginator:etag:news").unwrap().as_deref(),
            Some("abc")
        );
    }
}
