//! Wire data model of the CMS content API.
//!
//! The API serves websites, their languages and sections, the items of a
//! section, and the subsections of those items. Subsections carry the actual
//! content as named [`ContentElement`]s with a default value and per-language
//! [`Translation`]s:
//!
//! ```text
//! Website ─┬─ Language*
//!          └─ Section* ── SectionItem* ── SubSection* ── ContentElement* ── Translation*
//! ```
//!
//! Field names follow the API's camelCase JSON. Identifiers are accepted as
//! strings or numbers and under either `id` or `_id`, since both appear in
//! CMS payloads.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an identifier given as a JSON string or number.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(f) => f.to_string(),
    })
}

/// Reference to a language inside a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRef {
    /// Language code such as `en` or `ar`. Empty when the API omitted it.
    #[serde(rename = "languageID", alias = "languageId", default)]
    pub language_id: String,
}

/// Deserialize a translation's language given as a reference object, a bare
/// code string, or `null`.
fn language_ref<'de, D>(deserializer: D) -> Result<Option<LanguageRef>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLanguage {
        Code(String),
        Ref(LanguageRef),
    }

    Ok(Option::<RawLanguage>::deserialize(deserializer)?.map(|raw| match raw {
        RawLanguage::Code(language_id) => LanguageRef { language_id },
        RawLanguage::Ref(reference) => reference,
    }))
}

/// Language-specific override of a content element's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Translated content. May be empty; an empty match still wins over the default.
    #[serde(default)]
    pub content: String,
    /// The language this translation is for. Unpublished languages come
    /// back as `null` and such translations never match.
    #[serde(default, deserialize_with = "language_ref", skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageRef>,
}

impl Translation {
    /// Create a translation for `language_id`.
    pub fn new(language_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            language: Some(LanguageRef {
                language_id: language_id.into(),
            }),
        }
    }

    /// The language code, or `None` when the reference is missing or empty.
    #[must_use]
    pub fn language_id(&self) -> Option<&str> {
        self.language
            .as_ref()
            .map(|language| language.language_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Kind of a content element; decides how its value is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Plain or rich text, resolved through translations
    #[default]
    Text,
    /// Image, resolved from its URL field
    Image,
    /// Any other type the CMS may add; resolved like text
    #[serde(other)]
    Other,
}

/// A single named field of a subsection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentElement {
    /// Element identifier
    #[serde(alias = "_id", default, deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Field name, unique within the owning subsection
    pub name: String,
    /// Element type
    #[serde(rename = "type", default)]
    pub element_type: ElementType,
    /// Content used when no translation matches
    #[serde(default)]
    pub default_content: Option<String>,
    /// Explicit image location for image elements
    #[serde(default)]
    pub image_url: Option<String>,
    /// Per-language overrides, in API order
    #[serde(default)]
    pub translations: Vec<Translation>,
}

impl ContentElement {
    /// Create a text element with a default value and no translations.
    pub fn text(name: impl Into<String>, default_content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            element_type: ElementType::Text,
            default_content: Some(default_content.into()),
            image_url: None,
            translations: Vec::new(),
        }
    }

    /// Create an image element.
    pub fn image(name: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            element_type: ElementType::Image,
            default_content: None,
            image_url,
            translations: Vec::new(),
        }
    }

    /// Add a translation.
    #[must_use]
    pub fn with_translation(mut self, language_id: &str, content: &str) -> Self {
        self.translations.push(Translation::new(language_id, content));
        self
    }
}

/// A language-aware content block under a section item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSection {
    /// Subsection identifier
    #[serde(alias = "_id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Ordering key of the aggregated output
    #[serde(default)]
    pub order: Option<i64>,
    /// Whether this is the item's main subsection
    #[serde(default)]
    pub is_main: bool,
    /// Whether the subsection is published
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Owning section item
    #[serde(default, alias = "sectionItem")]
    pub section_item_id: Option<String>,
    /// Content elements; `None` when the payload carried no element list
    #[serde(default, alias = "contentElements")]
    pub elements: Option<Vec<ContentElement>>,
    /// Creation timestamp as sent by the API
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SubSection {
    /// Create an active subsection with an element list.
    pub fn new(id: impl Into<String>, order: i64, elements: Vec<ContentElement>) -> Self {
        Self {
            id: id.into(),
            name: None,
            order: Some(order),
            is_main: false,
            is_active: true,
            section_item_id: None,
            elements: Some(elements),
            created_at: None,
        }
    }

    /// Find an element by exact name.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ContentElement> {
        self.elements.as_deref().and_then(|elements| elements.iter().find(|e| e.name == name))
    }
}

/// A named entry within a section (for example one service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionItem {
    /// Item identifier
    #[serde(alias = "_id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Item name
    #[serde(default)]
    pub name: String,
    /// Owning section
    #[serde(default, alias = "section")]
    pub section_id: Option<String>,
    /// Whether the item is published
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Display order
    #[serde(default)]
    pub order: i64,
}

/// Top-level content grouping such as "Header" or "Services".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Section identifier
    #[serde(alias = "_id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Section name
    #[serde(default)]
    pub name: String,
    /// Optional machine-readable type, e.g. `hero` or `services`
    #[serde(default, alias = "type")]
    pub section_type: Option<String>,
    /// Whether the section is published
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Display order
    #[serde(default)]
    pub order: i64,
}

impl Section {
    /// Whether `query` names this section, by name or type, ignoring case.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query)
            || self.section_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(query))
    }
}

/// A website served by the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    /// Website identifier
    #[serde(alias = "_id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Website name
    #[serde(default)]
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// A language enabled for a website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// Language code used in translations
    #[serde(rename = "languageID", alias = "languageId")]
    pub language_id: String,
    /// Display name
    #[serde(default)]
    pub language: String,
    /// Whether the language is offered to visitors
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Whether this is the website's default language
    #[serde(default)]
    pub is_default: bool,
}

/// Colors of a theme. Only `primary` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Typography for one font role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    /// CSS font-family value
    pub family: String,
    /// Weight such as `700`; numbers are accepted
    #[serde(default, deserialize_with = "optional_id", skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// CSS size such as `1rem`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Font roles of a theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeFonts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<FontSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<FontSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<FontSpec>,
}

/// A website theme as stored in the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRecord {
    /// Theme identifier, used for the document marker class
    #[serde(alias = "_id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub colors: ThemeColors,
    #[serde(default)]
    pub fonts: ThemeFonts,
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "id_from_string_or_number")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(value)| value))
}

const fn default_true() -> bool {
    true
}
