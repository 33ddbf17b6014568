//! Application use cases / business logic

pub mod collect;
pub mod compose;
pub mod enrich;
pub mod filter;
pub mod pipeline;
pub mod publish;

pub use collect::{SourceCollector, SourceError};
pub use compose::{ComposeConfig, DEFAULT_LINK_BASE, FeedComposer, order_items};
pub use enrich::{DEFAULT_ENCLOSURE_LENGTH, EnrichConfig, Enricher};
pub use filter::filter_items;
pub use pipeline::{ComposedFeed, Pipeline, PipelineConfig, PipelineError};
pub use publish::{DEFAULT_NAMESPACE, FeedPublisher, PublishError};
