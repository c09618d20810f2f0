//! Declarative field mapping from a subsection to a flat view-model record.
//!
//! A [`FieldMapping`] lists output keys and the [`FieldRule`] that produces
//! each value. Rules are a tagged variant rather than "string or function":
//!
//! - [`FieldRule::Named`] - a content element name, optionally containing the
//!   `{index}` token for repeated fields ("Item {index} - Title")
//! - [`FieldRule::Id`] - the subsection identifier (`"_id"` in mapping strings)
//! - [`FieldRule::CreatedAt`] - the subsection creation time (`"createdAt"`)
//! - [`FieldRule::Derived`] - a function of `(subsection, repetition index)`
//!
//! ```rust
//! use cms_content::content::{FieldMapping, FieldValue};
//!
//! let mapping = FieldMapping::new()
//!     .field("title", "Item {index} - Title")
//!     .field("id", "_id")
//!     .derive("position", |_, index| Ok(FieldValue::Number(index as i64 + 1)));
//! assert_eq!(mapping.len(), 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::constants::INDEX_TOKEN;
use crate::content::resolver::resolve;
use crate::core::ContentError;
use crate::models::SubSection;

/// A single value of a view-model record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Resolved text (possibly empty)
    Text(String),
    /// A point in time, e.g. the subsection creation date
    Date(DateTime<Utc>),
    /// An integer produced by a derivation
    Number(i64),
}

impl FieldValue {
    /// Whether the value carries no content. Only empty text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// The text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Date(date) => write!(f, "{}", date.to_rfc3339()),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Derivation function: `(subsection, repetition index) -> value`.
pub type DeriveFn = Arc<dyn Fn(&SubSection, usize) -> anyhow::Result<FieldValue> + Send + Sync>;

/// How one output key obtains its value.
#[derive(Clone)]
pub enum FieldRule {
    /// Content element name template
    Named(String),
    /// The subsection identifier
    Id,
    /// The subsection creation timestamp
    CreatedAt,
    /// Caller-supplied derivation
    Derived(DeriveFn),
}

impl FieldRule {
    /// Parse a mapping string; `_id` and `createdAt` are sentinels.
    #[must_use]
    pub fn parse(rule: &str) -> Self {
        match rule {
            "_id" => Self::Id,
            "createdAt" => Self::CreatedAt,
            name => Self::Named(name.to_string()),
        }
    }
}

impl From<&str> for FieldRule {
    fn from(rule: &str) -> Self {
        Self::parse(rule)
    }
}

impl From<String> for FieldRule {
    fn from(rule: String) -> Self {
        Self::parse(&rule)
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Id => f.write_str("Id"),
            Self::CreatedAt => f.write_str("CreatedAt"),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Ordered list of `(output key, rule)` pairs.
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    fields: Vec<(String, FieldRule)>,
}

impl FieldMapping {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `key` from a rule string (element name template or sentinel).
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, rule: impl Into<FieldRule>) -> Self {
        self.fields.push((key.into(), rule.into()));
        self
    }

    /// Map `key` through a derivation function.
    #[must_use]
    pub fn derive<F>(mut self, key: impl Into<String>, derive: F) -> Self
    where
        F: Fn(&SubSection, usize) -> anyhow::Result<FieldValue> + Send + Sync + 'static,
    {
        self.fields.push((key.into(), FieldRule::Derived(Arc::new(derive))));
        self
    }

    /// Iterate over `(key, rule)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(key, rule)| (key.as_str(), rule))
    }

    /// Number of mapped keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the mapping has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the mapping produces `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }
}

/// Output of [`map_fields`]: the record plus whether anything in it is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedFields {
    /// Output key to value
    pub values: BTreeMap<String, FieldValue>,
    /// At least one value is non-empty
    pub has_valid_fields: bool,
}

/// Map one `(subsection, repetition)` pair through `mapping`.
///
/// `repetitions` is the number of items the caller extracts per subsection;
/// the `{index}` token is only substituted (with `repetition + 1`) when it is
/// greater than one.
///
/// # Errors
///
/// Returns [`ContentError::MalformedInput`] when the subsection has no element
/// list or a derivation function fails. Callers skip such items.
pub fn map_fields(
    subsection: &SubSection,
    mapping: &FieldMapping,
    repetition: usize,
    repetitions: usize,
    language: &str,
) -> Result<MappedFields, ContentError> {
    if subsection.elements.is_none() {
        return Err(ContentError::MalformedInput {
            subsection: subsection.id.clone(),
            reason: "no element list".to_string(),
        });
    }

    let mut values = BTreeMap::new();
    let mut has_valid_fields = false;

    for (key, rule) in mapping.iter() {
        let value = match rule {
            FieldRule::Derived(derive) => {
                derive(subsection, repetition).map_err(|e| ContentError::MalformedInput {
                    subsection: subsection.id.clone(),
                    reason: format!("derivation of '{key}' failed: {e}"),
                })?
            }
            FieldRule::Id => FieldValue::Text(subsection.id.clone()),
            FieldRule::CreatedAt => subsection
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .map_or_else(|| FieldValue::Text(String::new()), FieldValue::Date),
            FieldRule::Named(template) => {
                let name = expand_template(template, repetition, repetitions);
                FieldValue::Text(resolve(subsection.element(&name), language))
            }
        };

        has_valid_fields |= !value.is_empty();
        values.insert(key.to_string(), value);
    }

    Ok(MappedFields {
        values,
        has_valid_fields,
    })
}

/// Substitute the `{index}` token when more than one repetition is requested.
#[must_use]
pub fn expand_template(template: &str, repetition: usize, repetitions: usize) -> String {
    if repetitions > 1 {
        template.replace(INDEX_TOKEN, &(repetition + 1).to_string())
    } else {
        template.to_string()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
