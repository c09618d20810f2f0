//! Translation resolution for a single content element.
//!
//! Resolution never fails. Missing data degrades along a fixed chain:
//!
//! | Element | Result |
//! |---|---|
//! | absent | `""` |
//! | image type | `image_url`, then `default_content`, then [`PLACEHOLDER_IMAGE`] |
//! | no translations | `default_content` or `""` |
//! | translation for the language exists | its content, even when empty |
//! | no translation for the language | `default_content` or `""` |
//!
//! When several translations share a language code, the first one in API
//! order wins.

use tracing::trace;

use crate::constants::PLACEHOLDER_IMAGE;
use crate::models::{ContentElement, ElementType};

/// Resolve the best available string for `element` in `language`.
///
/// # Examples
///
/// ```rust
/// use cms_content::content::resolve;
/// use cms_content::models::ContentElement;
///
/// let title = ContentElement::text("Title", "Hello").with_translation("ar", "مرحبا");
/// assert_eq!(resolve(Some(&title), "ar"), "مرحبا");
/// assert_eq!(resolve(Some(&title), "fr"), "Hello");
/// assert_eq!(resolve(None, "en"), "");
/// ```
#[must_use]
pub fn resolve(element: Option<&ContentElement>, language: &str) -> String {
    let Some(element) = element else {
        return String::new();
    };

    if element.element_type == ElementType::Image {
        return resolve_image(element);
    }

    // Translations without a language code never match
    match element.translations.iter().find(|t| t.language_id() == Some(language)) {
        Some(translation) => translation.content.clone(),
        None => {
            trace!(element = %element.name, language, "no translation, using default content");
            default_content(element)
        }
    }
}

fn resolve_image(element: &ContentElement) -> String {
    non_empty(element.image_url.as_deref())
        .or_else(|| non_empty(element.default_content.as_deref()))
        .unwrap_or(PLACEHOLDER_IMAGE)
        .to_string()
}

fn default_content(element: &ContentElement) -> String {
    element.default_content.clone().unwrap_or_default()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
