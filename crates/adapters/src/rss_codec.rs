//! RSS 2.0 parser and renderer

use holginator_domain::{
    ComposedChannel, Enclosure, FeedCodec, Item, ParsedFeed, RenderError, SourceChannel,
    SourceParseError,
};
use rss::{ChannelBuilder, EnclosureBuilder, ImageBuilder, ItemBuilder};
use time::OffsetDateTime;
use time::format_description::well_known::{Rfc2822, Rfc3339};

/// Feed codec built on the `rss` crate
///
/// Parsing performs no schema validation: missing optional elements and
/// unknown extensions are accepted, only malformed XML or a non-RSS root is
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssCodec;

impl RssCodec {
    pub fn new() -> Self {
        Self
    }
}

fn convert_item(item: &rss::Item) -> Option<Item> {
    let Some(enclosure) = item.enclosure() else {
        tracing::debug!(title = ?item.title(), "Dropping item without enclosure");
        return None;
    };

    Some(Item {
        title: item.title().unwrap_or_default().to_string(),
        description: item.description().map(String::from),
        published: item.pub_date().and_then(parse_date),
        link: item.link().map(String::from),
        enclosure: Enclosure {
            url: enclosure.url().to_string(),
            mime_type: enclosure.mime_type().to_string(),
            length: enclosure.length().trim().parse().ok(),
        },
    })
}

/// RFC 2822 as the format requires, RFC 3339 as seen in the wild
///
/// Dates RFC 2822 cannot express (before 1900, e.g. zero-value timestamps)
/// count as undated.
fn parse_date(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    OffsetDateTime::parse(value, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(value, &Rfc3339))
        .ok()
        .filter(|date| date.year() >= 1900)
}

fn format_date(value: OffsetDateTime) -> Result<String, RenderError> {
    value
        .format(&Rfc2822)
        .map_err(|e| RenderError::Format(e.to_string()))
}

fn render_item(item: &Item) -> Result<rss::Item, RenderError> {
    let pub_date = item.published.and_then(|published| {
        format_date(published)
            .inspect_err(|e| {
                tracing::debug!(title = %item.title, error = %e, "Dropping unrenderable date");
            })
            .ok()
    });
    let length = item.enclosure.length.ok_or_else(|| {
        RenderError::Format(format!("Enclosure length missing for {}", item.enclosure.url))
    })?;

    let enclosure = EnclosureBuilder::default()
        .url(item.enclosure.url.clone())
        .length(length.to_string())
        .mime_type(item.enclosure.mime_type.clone())
        .build();

    Ok(ItemBuilder::default()
        .title(Some(item.title.clone()))
        .description(item.description.clone())
        .link(item.link.clone())
        .pub_date(pub_date)
        .enclosure(Some(enclosure))
        .build())
}

impl FeedCodec for RssCodec {
    fn parse(&self, body: &[u8]) -> Result<ParsedFeed, SourceParseError> {
        let channel =
            rss::Channel::read_from(body).map_err(|e| SourceParseError(e.to_string()))?;

        let items = channel.items().iter().filter_map(convert_item).collect();

        Ok(ParsedFeed {
            channel: SourceChannel {
                title: channel.title().to_string(),
            },
            items,
        })
    }

    fn render(&self, channel: &ComposedChannel, items: &[Item]) -> Result<String, RenderError> {
        let items = items.iter().map(render_item).collect::<Result<Vec<_>, _>>()?;

        let image = ImageBuilder::default()
            .title(channel.image.title.clone())
            .url(channel.image.url.clone())
            .link(channel.link.clone())
            .build();

        let document = ChannelBuilder::default()
            .title(channel.title.clone())
            .link(channel.link.clone())
            .description(channel.description.clone())
            .last_build_date(Some(format_date(channel.updated)?))
            .image(Some(image))
            .items(items)
            .build();

        let buffer = document
            .pretty_write_to(Vec::new(), b' ', 2)
            .map_err(|e| RenderError::Serialize(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| RenderError::Serialize(e.to_string()))
    }
}
