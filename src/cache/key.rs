//! Cache keys for content queries.

use std::collections::BTreeMap;
use std::fmt;

/// Identifies one logical query: `(entity, id, params, language)`.
///
/// Two requests share a cache entry (and an in-flight fetch) exactly when
/// their keys are equal. The language is part of the key because translation
/// resolution depends on it: the same section in `en` and `ar` are separate
/// entries.
///
/// Parameters are kept sorted so insertion order never changes identity.
///
/// ```rust
/// use cms_content::cache::QueryKey;
///
/// let en = QueryKey::new("section-content", "services").param("website", "w1").language("en");
/// let ar = QueryKey::new("section-content", "services").param("website", "w1").language("ar");
/// assert_ne!(en, ar);
/// assert_eq!(en.to_string(), "section-content/services?website=w1#en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    entity: String,
    id: String,
    params: BTreeMap<String, String>,
    language: Option<String>,
}

impl QueryKey {
    /// Create a key for `entity` with identifier `id`.
    pub fn new(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            id: id.into(),
            params: BTreeMap::new(),
            language: None,
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Scope the key to a language.
    #[must_use]
    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.language = Some(code.into());
        self
    }

    /// Entity name, e.g. `sections`.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Entity identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Value of a parameter.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Language the key is scoped to.
    #[must_use]
    pub fn language_code(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.id)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        if let Some(language) = &self.language {
            write!(f, "#{language}")?;
        }
        Ok(())
    }
}
