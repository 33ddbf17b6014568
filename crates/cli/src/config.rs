//! Configuration loading and management

use anyhow::{Context, Result};
use holginator_adapters::feed::HttpConfig;
use holginator_domain::usecases::{
    ComposeConfig, DEFAULT_ENCLOSURE_LENGTH, DEFAULT_LINK_BASE, DEFAULT_NAMESPACE, EnrichConfig,
    PipelineConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_feeds_path")]
    pub feeds_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_feeds: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_sources: usize,

    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,

    #[serde(default = "default_enclosure_length")]
    pub default_enclosure_length: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_link_base")]
    pub link_base: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Environment variable holding the Redis URL
    #[serde(default = "default_url_env")]
    pub url_env: String,

    /// Used when `url_env` is unset
    #[serde(default = "default_store_url")]
    pub default_url: String,
}

// Default value functions
fn default_feeds_path() -> PathBuf {
    PathBuf::from("./feeds.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrent() -> usize {
    4
}

fn default_timeout() -> u64 {
    30
}

fn default_lookup_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("holginator/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_concurrent_lookups() -> usize {
    8
}

fn default_enclosure_length() -> u64 {
    DEFAULT_ENCLOSURE_LENGTH
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_link_base() -> String {
    DEFAULT_LINK_BASE.to_string()
}

fn default_url_env() -> String {
    "REDISCLOUD_URL".to_string()
}

fn default_store_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            feeds_path: default_feeds_path(),
            log_level: default_log_level(),
            dry_run: false,
            max_concurrent_feeds: default_max_concurrent(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            lookup_timeout_secs: default_lookup_timeout(),
            user_agent: default_user_agent(),
            max_concurrent_sources: default_max_concurrent(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
            default_enclosure_length: default_enclosure_length(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            link_base: default_link_base(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url_env: default_url_env(),
            default_url: default_store_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("HOLGINATOR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.fetch.timeout_secs),
            user_agent: self.fetch.user_agent.clone(),
        }
    }

    pub fn pipeline_config(&self, dry_run: bool) -> PipelineConfig {
        PipelineConfig {
            dry_run,
            max_concurrent_feeds: self.general.max_concurrent_feeds,
            max_concurrent_sources: self.fetch.max_concurrent_sources,
            namespace: self.publish.namespace.clone(),
            enrich_config: EnrichConfig {
                default_enclosure_length: self.fetch.default_enclosure_length,
                max_concurrent_lookups: self.fetch.max_concurrent_lookups,
                lookup_timeout: Duration::from_secs(self.fetch.lookup_timeout_secs),
            },
            compose_config: ComposeConfig {
                link_base: self.publish.link_base.clone(),
            },
        }
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# holginator configuration

[general]
feeds_path = "./feeds.json"
log_level = "info"
dry_run = false
max_concurrent_feeds = 4

[fetch]
timeout_secs = 30
lookup_timeout_secs = 10
# user_agent = "holginator/0.1.0"
max_concurrent_sources = 4
max_concurrent_lookups = 8
default_enclosure_length = 1000000

[publish]
namespace = "holginator"
link_base = "http://holginator.poddata.net/"

[store]
backend = "redis"  # redis, memory
url_env = "REDISCLOUD_URL"
default_url = "redis://127.0.0.1:6379/"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_matches_defaults() {
        let parsed: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                &AppConfig::example_toml(),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let defaults = AppConfig::default();
        assert_eq!(parsed.general.feeds_path, defaults.general.feeds_path);
        assert_eq!(parsed.fetch.timeout_secs, defaults.fetch.timeout_secs);
        assert_eq!(parsed.publish.namespace, "holginator");
        assert_eq!(parsed.store.backend, StoreBackend::Redis);
        assert_eq!(parsed.store.url_env, "REDISCLOUD_URL");
    }

    #[test]
    fn test_pipeline_config_from_sections() {
        let mut config = AppConfig::default();
        config.fetch.lookup_timeout_secs = 3;
        config.publish.link_base = "https://feeds.example.org/".to_string();

        let pipeline = config.pipeline_config(true);

        assert!(pipeline.dry_run);
        assert_eq!(pipeline.enrich_config.lookup_timeout, Duration::from_secs(3));
        assert_eq!(pipeline.enrich_config.default_enclosure_length, 1_000_000);
        assert_eq!(pipeline.compose_config.link_base, "https://feeds.example.org/");
    }
}
