//! Redis key-value store

use async_trait::async_trait;
use holginator_domain::{KeyValueStore, StoreError};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use secrecy::{ExposeSecret, SecretString};

/// Redis-backed store; the connection manager reconnects on its own
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect to the Redis server at `url`
    ///
    /// The URL may embed a password; it never appears in errors or logs.
    pub async fn connect(url: &SecretString) -> Result<Self, StoreError> {
        let client = redis::Client::open(url.expose_secret())
            .map_err(|e| StoreError::Connection(format!("Invalid Redis URL ({:?})", e.kind())))?;

        let info = client.get_connection_info();
        tracing::debug!(
            host = %info.addr,
            db = info.redis.db,
            "Connecting to Redis"
        );

        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        connection
            .set::<_, _, ()>(key, value)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))
    }

    /// Single `MSET`, so readers never see half of the pairs
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut connection = self.connection.clone();
        connection
            .mset::<_, _, ()>(entries)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
