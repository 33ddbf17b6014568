//! holginator adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `definitions`: JSON file definitions loader
//! - `feed`: HTTP fetching, enclosure probing and the RSS codec
//! - `store`: Redis and in-memory key-value stores

mod definitions_json;
mod http;
mod rss_codec;
mod store_memory;
mod store_redis;

/// Re-exports for definitions adapters
pub mod definitions {
    pub use crate::definitions_json::JsonDefinitionsRepo;
}

/// Re-exports for feed adapters
pub mod feed {
    pub use crate::http::{HttpConfig, HttpFeedClient};
    pub use crate::rss_codec::RssCodec;
}

/// Re-exports for key-value store adapters
pub mod store {
    pub use crate::store_memory::InMemoryStore;
    pub use crate::store_redis::RedisStore;
}
