//! Theme variable injection.
//!
//! A [`ThemeRecord`] becomes a set of CSS custom properties on the document
//! root plus a `theme-{id}` marker class:
//!
//! | Variable | Source |
//! |---|---|
//! | `--color-{role}` | theme color, else primary or a fixed fallback |
//! | `--color-primary-50` .. `-400` | primary lightened by 0.9 .. 0.2 |
//! | `--color-primary-600` .. `-900` | primary darkened by 0.1 .. 0.4 |
//! | `--font-{role}-{family,weight,size}` | heading, body and accent fonts |
//!
//! Applying is idempotent: the same theme twice leaves the same state. A new
//! theme replaces the previous marker class, and any primary step or font
//! variable the new theme does not define is removed.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::constants::{
    FALLBACK_BACKGROUND_COLOR, FALLBACK_ERROR_COLOR, FALLBACK_SUCCESS_COLOR, FALLBACK_TEXT_COLOR,
    FALLBACK_WARNING_COLOR, PRIMARY_SHADES, PRIMARY_TINTS, THEME_CLASS_PREFIX,
};
use crate::models::{FontSpec, ThemeRecord};

pub mod color;

pub use color::Rgb;

/// Where theme variables are written; in a browser, the document root element.
pub trait StyleTarget {
    /// Set a CSS custom property.
    fn set_property(&mut self, name: &str, value: &str);

    /// Remove a CSS custom property. Removing an unset property is a no-op.
    fn remove_property(&mut self, name: &str);

    /// Classes currently on the target.
    fn classes(&self) -> Vec<String>;

    /// Add `class` unless it is already present.
    fn add_class(&mut self, class: &str);

    /// Remove `class` if present.
    fn remove_class(&mut self, class: &str);
}

/// In-memory document root that can render itself as CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRoot {
    properties: Vec<(String, String)>,
    classes: Vec<String>,
}

impl DocumentRoot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a custom property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// All properties in the order they were first set.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Render as a `:root` rule preceded by a comment listing the classes.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if !self.classes.is_empty() {
            css.push_str(&format!("/* classes: {} */\n", self.classes.join(" ")));
        }
        css.push_str(":root {\n");
        for (name, value) in &self.properties {
            css.push_str(&format!("  {name}: {value};\n"));
        }
        css.push_str("}\n");
        css
    }
}

impl StyleTarget for DocumentRoot {
    fn set_property(&mut self, name: &str, value: &str) {
        match self.properties.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.properties.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_property(&mut self, name: &str) {
        self.properties.retain(|(n, _)| n != name);
    }

    fn classes(&self) -> Vec<String> {
        self.classes.clone()
    }

    fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}

/// Marker class for a theme id; whitespace becomes `-`.
#[must_use]
pub fn theme_class(theme_id: &str) -> String {
    let id: String = theme_id
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    format!("{THEME_CLASS_PREFIX}{id}")
}

/// Every variable a theme defines, in a stable order.
///
/// An unparseable primary color is still written as given, but its tints and
/// shades are left out.
#[must_use]
pub fn theme_variables(theme: &ThemeRecord) -> Vec<(String, String)> {
    let colors = &theme.colors;
    let primary = colors.primary.as_str();
    let or_primary = |value: &Option<String>| value.as_deref().unwrap_or(primary).to_string();
    let or_fallback = |value: &Option<String>, fallback: &str| value.as_deref().unwrap_or(fallback).to_string();

    let mut vars = vec![
        ("--color-primary".to_string(), primary.to_string()),
        ("--color-secondary".to_string(), or_primary(&colors.secondary)),
        ("--color-background".to_string(), or_fallback(&colors.background, FALLBACK_BACKGROUND_COLOR)),
        ("--color-text".to_string(), or_fallback(&colors.text, FALLBACK_TEXT_COLOR)),
        ("--color-accent".to_string(), or_primary(&colors.accent)),
        ("--color-border".to_string(), or_primary(&colors.border)),
        ("--color-hover".to_string(), or_primary(&colors.hover)),
        ("--color-error".to_string(), or_fallback(&colors.error, FALLBACK_ERROR_COLOR)),
        ("--color-success".to_string(), or_fallback(&colors.success, FALLBACK_SUCCESS_COLOR)),
        ("--color-warning".to_string(), or_fallback(&colors.warning, FALLBACK_WARNING_COLOR)),
    ];

    match Rgb::parse(primary) {
        Ok(base) => {
            for (step, amount) in PRIMARY_TINTS {
                vars.push((format!("--color-primary-{step}"), base.lighten(amount).to_string()));
            }
            for (step, amount) in PRIMARY_SHADES {
                vars.push((format!("--color-primary-{step}"), base.darken(amount).to_string()));
            }
        }
        Err(e) => warn!(theme = %theme.id, "Skipping primary shades: {e}"),
    }

    let fonts = [
        ("heading", &theme.fonts.heading),
        ("body", &theme.fonts.body),
        ("accent", &theme.fonts.accent),
    ];
    for (role, font) in fonts {
        if let Some(font) = font {
            push_font(&mut vars, role, font);
        }
    }

    vars
}

fn push_font(vars: &mut Vec<(String, String)>, role: &str, font: &FontSpec) {
    vars.push((format!("--font-{role}-family"), font.family.clone()));
    if let Some(weight) = &font.weight {
        vars.push((format!("--font-{role}-weight"), weight.clone()));
    }
    if let Some(size) = &font.size {
        vars.push((format!("--font-{role}-size"), size.clone()));
    }
}

/// Variables that only some themes define: the primary steps and every
/// font role property.
fn optional_variable_names() -> impl Iterator<Item = String> {
    let steps = PRIMARY_TINTS
        .iter()
        .chain(PRIMARY_SHADES.iter())
        .map(|(step, _)| format!("--color-primary-{step}"));
    let fonts = ["heading", "body", "accent"].into_iter().flat_map(|role| {
        ["family", "weight", "size"]
            .into_iter()
            .map(move |property| format!("--font-{role}-{property}"))
    });
    steps.chain(fonts)
}

/// Write `theme` to `target` and tag it with the theme's marker class,
/// removing any other theme marker and any variable left by a previous theme.
pub fn apply_theme<S: StyleTarget + ?Sized>(target: &mut S, theme: &ThemeRecord) {
    let vars = theme_variables(theme);
    for (name, value) in &vars {
        target.set_property(name, value);
    }
    for name in optional_variable_names() {
        if !vars.iter().any(|(written, _)| *written == name) {
            target.remove_property(&name);
        }
    }

    let marker = theme_class(&theme.id);
    for class in target.classes() {
        if class.starts_with(THEME_CLASS_PREFIX) && class != marker {
            target.remove_class(&class);
        }
    }
    target.add_class(&marker);

    debug!(theme = %theme.id, variables = vars.len(), "applied theme");
}

/// Theme variables as a sorted map, for JSON output.
#[must_use]
pub fn variables_map(theme: &ThemeRecord) -> BTreeMap<String, String> {
    theme_variables(theme).into_iter().collect()
}
