//! Listing commands: websites, languages, sections.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{CliConfig, CommandContext, OutputFormat};
use crate::api::ContentApi;
use crate::content::TextDirection;

#[derive(Args)]
pub struct WebsitesCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl WebsitesCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let ctx = CommandContext::load(cli).await?;
        let websites = ctx.api.websites().await.context("Failed to list websites")?;

        if self.format == OutputFormat::Json {
            return print_json(&websites);
        }

        if websites.is_empty() {
            println!("No websites found");
            return Ok(());
        }
        for website in &websites {
            match &website.description {
                Some(description) => {
                    println!("{}  {} - {}", website.id.cyan(), website.name.bold(), description.dimmed());
                }
                None => println!("{}  {}", website.id.cyan(), website.name.bold()),
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct LanguagesCommand {
    /// Website identifier
    #[arg(long)]
    website: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct LanguageRow<'a> {
    code: &'a str,
    name: &'a str,
    active: bool,
    default: bool,
    direction: TextDirection,
}

impl LanguagesCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let ctx = CommandContext::load(cli).await?;
        let languages = ctx
            .loader
            .languages(&self.website)
            .await
            .into_result()
            .with_context(|| format!("Failed to list languages of website {}", self.website))?;

        let rows: Vec<LanguageRow<'_>> = languages
            .iter()
            .map(|l| LanguageRow {
                code: &l.language_id,
                name: &l.language,
                active: l.is_active,
                default: l.is_default,
                direction: l.direction(),
            })
            .collect();

        if self.format == OutputFormat::Json {
            return print_json(&rows);
        }

        if rows.is_empty() {
            println!("No languages configured for {}", self.website);
            return Ok(());
        }
        for row in &rows {
            let mut line = format!("{:<8} {} ({})", row.code.cyan(), row.name, row.direction.as_str());
            if row.default {
                line.push_str(&format!(" {}", "[default]".green()));
            }
            if !row.active {
                line.push_str(&format!(" {}", "[inactive]".yellow()));
            }
            println!("{line}");
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct SectionsCommand {
    /// Website identifier
    #[arg(long)]
    website: String,

    /// Include unpublished sections
    #[arg(long)]
    include_inactive: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl SectionsCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let ctx = CommandContext::load(cli).await?;
        let sections = ctx
            .loader
            .list_sections(&self.website, self.include_inactive)
            .await
            .into_result()
            .with_context(|| format!("Failed to list sections of website {}", self.website))?;

        let mut sections: Vec<_> = sections.iter().collect();
        sections.sort_by_key(|s| s.order);

        if self.format == OutputFormat::Json {
            return print_json(&sections);
        }

        if sections.is_empty() {
            println!("No sections found for {}", self.website);
            return Ok(());
        }
        for section in sections {
            let mut line = format!("{}  {}", section.id.cyan(), section.name.bold());
            if let Some(kind) = &section.section_type {
                line.push_str(&format!(" ({kind})"));
            }
            if !section.is_active {
                line.push_str(&format!(" {}", "[inactive]".yellow()));
            }
            println!("{line}");
        }
        Ok(())
    }
}

pub(super) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}
