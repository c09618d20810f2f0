//! Aggregation of a section's subsections into ordered view models.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::content::mapping::{FieldMapping, FieldValue, map_fields};
use crate::models::SubSection;

/// Output key that, when produced by a mapping, overrides the ordering key.
pub const ORDER_KEY: &str = "order";

/// The flattened, language-resolved record for one `(subsection, repetition)` pair.
///
/// Serializes as a flat object: `{"title": "...", "order": 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    /// Mapped values by output key
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Ordering key
    pub order: i64,
}

impl ViewModel {
    /// Value for `key`, if the mapping produced it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Text value for `key`; empty when absent or not text.
    #[must_use]
    pub fn text(&self, key: &str) -> &str {
        self.fields.get(key).and_then(FieldValue::as_text).unwrap_or("")
    }
}

/// Predicate applied to each candidate item after mapping.
pub type ItemFilter<'a> = &'a (dyn Fn(&ViewModel) -> bool + Send + Sync);

/// Map every subsection (and repetition) and return the ordered view models.
///
/// Items are kept when at least one mapped value is non-empty and `filter`
/// (if any) accepts them. The ordering key is, in priority order: an `order`
/// value produced by the mapping, the subsection's own `order`, and finally
/// the synthetic `subsection_index * repetitions + repetition`. The result is
/// stably sorted by that key, so ties keep encounter order.
///
/// `repetitions` of zero or one both mean one item per subsection.
///
/// # Examples
///
/// ```rust
/// use cms_content::content::{aggregate, FieldMapping};
/// use cms_content::models::{ContentElement, SubSection};
///
/// let subsections = vec![SubSection::new(
///     "s1",
///     1,
///     vec![ContentElement::text("Title", "Hello").with_translation("ar", "مرحبا")],
/// )];
/// let mapping = FieldMapping::new().field("title", "Title");
///
/// let items = aggregate(&subsections, &mapping, 1, None, "ar");
/// assert_eq!(items[0].text("title"), "مرحبا");
/// assert_eq!(items[0].order, 1);
/// ```
#[must_use]
pub fn aggregate(
    subsections: &[SubSection],
    mapping: &FieldMapping,
    repetitions: usize,
    filter: Option<ItemFilter<'_>>,
    language: &str,
) -> Vec<ViewModel> {
    let repetitions = repetitions.max(1);
    let mut items = Vec::with_capacity(subsections.len() * repetitions);

    for (subsection_index, subsection) in subsections.iter().enumerate() {
        for repetition in 0..repetitions {
            let mapped = match map_fields(subsection, mapping, repetition, repetitions, language) {
                Ok(mapped) => mapped,
                Err(e) => {
                    warn!("Skipping subsection item: {e}");
                    continue;
                }
            };

            if !mapped.has_valid_fields {
                continue;
            }

            let mut fields = mapped.values;
            let synthetic = (subsection_index * repetitions + repetition) as i64;
            let order = fields
                .remove(ORDER_KEY)
                .and_then(|value| order_from_value(&value))
                .or(subsection.order)
                .unwrap_or(synthetic);

            let item = ViewModel {
                fields,
                order,
            };

            if filter.is_none_or(|accept| accept(&item)) {
                items.push(item);
            }
        }
    }

    // Vec::sort_by_key is stable; equal orders keep insertion order
    items.sort_by_key(|item| item.order);

    debug!(
        subsections = subsections.len(),
        items = items.len(),
        language,
        "aggregated section content"
    );
    items
}

fn order_from_value(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(text) => text.trim().parse().ok(),
        FieldValue::Date(_) => None,
    }
}
