//! Language selection and text direction.

use serde::Serialize;

use crate::constants::RTL_LANGUAGES;
use crate::models::Language;

/// Writing direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right
    Ltr,
    /// Right to left
    Rtl,
}

impl TextDirection {
    /// Direction of a language code; regional variants (`ar-EG`, `fa_IR`) follow their base language.
    #[must_use]
    pub fn of(code: &str) -> Self {
        let base = code.split(['-', '_']).next().unwrap_or(code);
        if RTL_LANGUAGES.iter().any(|rtl| rtl.eq_ignore_ascii_case(base)) {
            Self::Rtl
        } else {
            Self::Ltr
        }
    }

    /// The HTML `dir` attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

impl Language {
    /// Writing direction of this language.
    #[must_use]
    pub fn direction(&self) -> TextDirection {
        TextDirection::of(&self.language_id)
    }
}

/// Pick the language to render.
///
/// Preference: the requested code if it is active, then the website default,
/// then the first active language.
#[must_use]
pub fn select_language<'a>(languages: &'a [Language], requested: Option<&str>) -> Option<&'a Language> {
    let active = || languages.iter().filter(|l| l.is_active);

    requested
        .and_then(|code| active().find(|l| l.language_id.eq_ignore_ascii_case(code)))
        .or_else(|| active().find(|l| l.is_default))
        .or_else(|| active().next())
}
