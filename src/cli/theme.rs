//! The `theme` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::json;

use super::browse::print_json;
use crate::models::ThemeRecord;
use crate::theme::{DocumentRoot, apply_theme, theme_class, variables_map};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ThemeFormat {
    /// A `:root` CSS rule
    #[default]
    Css,
    /// JSON object with the marker class and variables
    Json,
}

#[derive(Args)]
pub struct ThemeCommand {
    /// Theme record as JSON
    #[arg(long)]
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = ThemeFormat::Css)]
    format: ThemeFormat,
}

impl ThemeCommand {
    pub async fn execute(self) -> Result<()> {
        let raw = tokio::fs::read_to_string(&self.file)
            .await
            .with_context(|| format!("Failed to read theme file {}", self.file.display()))?;
        let theme: ThemeRecord = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse theme record in {}", self.file.display()))?;

        match self.format {
            ThemeFormat::Css => {
                let mut root = DocumentRoot::new();
                apply_theme(&mut root, &theme);
                print!("{}", root.to_css());
                Ok(())
            }
            ThemeFormat::Json => print_json(&json!({
                "class": theme_class(&theme.id),
                "variables": variables_map(&theme),
            })),
        }
    }
}
