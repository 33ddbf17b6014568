//! Item selection by per-source pattern

use crate::model::{Item, ItemFilter};

/// Keep the items matching `filter`, preserving order
///
/// Without a filter every item is returned unchanged.
pub fn filter_items(items: Vec<Item>, filter: Option<&ItemFilter>) -> Vec<Item> {
    let Some(filter) = filter else {
        return items;
    };

    let before = items.len();
    let kept: Vec<Item> = items
        .into_iter()
        .filter(|item| filter.matches(item))
        .collect();

    tracing::debug!(
        pattern = %filter.as_str(),
        before,
        after = kept.len(),
        "Filtered items"
    );

    kept
}
