//! Composition use case - merges, orders and renders the items of one composed feed

use std::sync::Arc;

use crate::{
    model::{ComposedChannel, ComposedFeedDefinition, FeedImage, Item, RenderedFeed},
    ports::{Clock, FeedCodec, RenderError},
};

/// Public base URL of composed feeds
pub const DEFAULT_LINK_BASE: &str = "http://holginator.poddata.net/";

/// Configuration for the composer
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Prefix of every composed feed's advertised link
    pub link_base: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            link_base: DEFAULT_LINK_BASE.to_string(),
        }
    }
}

/// Builds the output document of a composed feed
pub struct FeedComposer<C: ?Sized, Cl: ?Sized> {
    codec: Arc<C>,
    clock: Arc<Cl>,
    config: ComposeConfig,
}

impl<C, Cl> FeedComposer<C, Cl>
where
    C: FeedCodec + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(codec: Arc<C>, clock: Arc<Cl>, config: ComposeConfig) -> Self {
        Self {
            codec,
            clock,
            config,
        }
    }

    /// Order already-enriched items and render them under the definition's channel
    pub fn compose(
        &self,
        definition: &ComposedFeedDefinition,
        items: Vec<Item>,
    ) -> Result<RenderedFeed, RenderError> {
        let items = order_items(items);
        let channel = self.channel_for(definition);

        let document = self.codec.render(&channel, &items)?;
        let rendered = RenderedFeed::new(document, items.len());

        tracing::debug!(
            feed = %definition.name,
            items = rendered.item_count,
            fingerprint = %rendered.fingerprint,
            "Rendered composed feed"
        );

        Ok(rendered)
    }

    /// Channel and image metadata for a definition, stamped with the current time
    pub fn channel_for(&self, definition: &ComposedFeedDefinition) -> ComposedChannel {
        ComposedChannel {
            title: definition.title.clone(),
            description: definition.description.clone(),
            link: self.feed_link(&definition.name),
            updated: self.clock.now(),
            image: FeedImage {
                title: definition.title.clone(),
                url: definition.image.clone(),
            },
        }
    }

    /// Advertised link of the composed feed called `name`
    pub fn feed_link(&self, name: &str) -> String {
        format!("{}{}", self.config.link_base, name)
    }
}

/// Most recent first; undated items last; ties keep input order
pub fn order_items(mut items: Vec<Item>) -> Vec<Item> {
    items.sort_by(|a, b| b.published.cmp(&a.published));
    items
}
