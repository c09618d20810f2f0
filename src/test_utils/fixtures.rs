//! Builders for CMS payloads used in tests.

use crate::models::{
    ContentElement, FontSpec, SubSection, ThemeColors, ThemeFonts, ThemeRecord, Translation,
};

/// A text element with a default value.
pub fn element(name: &str, default_content: &str) -> ContentElement {
    ContentElement::text(name, default_content)
}

/// Fluent builder for [`SubSection`] values.
#[derive(Debug, Clone)]
pub struct SubSectionBuilder {
    subsection: SubSection,
}

impl SubSectionBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            subsection: SubSection {
                id: id.to_string(),
                name: None,
                order: None,
                is_main: false,
                is_active: true,
                section_item_id: None,
                elements: Some(Vec::new()),
                created_at: None,
            },
        }
    }

    pub const fn order(mut self, order: i64) -> Self {
        self.subsection.order = Some(order);
        self
    }

    pub const fn main(mut self) -> Self {
        self.subsection.is_main = true;
        self
    }

    pub const fn inactive(mut self) -> Self {
        self.subsection.is_active = false;
        self
    }

    pub fn created_at(mut self, timestamp: &str) -> Self {
        self.subsection.created_at = Some(timestamp.to_string());
        self
    }

    pub fn text(self, name: &str, default_content: &str) -> Self {
        self.element(element(name, default_content))
    }

    /// A text element with `(language, content)` translations.
    pub fn translated(self, name: &str, default_content: &str, translations: &[(&str, &str)]) -> Self {
        let mut el = element(name, default_content);
        el.translations = translations
            .iter()
            .map(|(language, content)| Translation::new(*language, *content))
            .collect();
        self.element(el)
    }

    pub fn image(self, name: &str, url: &str) -> Self {
        self.element(ContentElement::image(name, Some(url.to_string())))
    }

    pub fn element(mut self, element: ContentElement) -> Self {
        self.subsection.elements.get_or_insert_with(Vec::new).push(element);
        self
    }

    /// Drop the element list entirely, as malformed payloads do.
    pub fn without_elements(mut self) -> Self {
        self.subsection.elements = None;
        self
    }

    pub fn build(self) -> SubSection {
        self.subsection
    }
}

/// A complete theme with every color and font role set.
pub fn sample_theme() -> ThemeRecord {
    let font = |family: &str, weight: &str, size: &str| FontSpec {
        family: family.to_string(),
        weight: Some(weight.to_string()),
        size: Some(size.to_string()),
    };

    ThemeRecord {
        id: "ocean".to_string(),
        name: "Ocean".to_string(),
        colors: ThemeColors {
            primary: "#3366cc".to_string(),
            secondary: Some("#64748b".to_string()),
            background: Some("#f8fafc".to_string()),
            text: Some("#0f172a".to_string()),
            accent: Some("#f97316".to_string()),
            border: Some("#e2e8f0".to_string()),
            hover: Some("#1d4ed8".to_string()),
            error: None,
            success: None,
            warning: None,
        },
        fonts: ThemeFonts {
            heading: Some(font("Poppins, sans-serif", "700", "2rem")),
            body: Some(font("Inter, sans-serif", "400", "1rem")),
            accent: None,
        },
    }
}
