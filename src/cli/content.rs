//! The `content` command.

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use colored::Colorize;

use super::browse::print_json;
use super::{CliConfig, CommandContext, OutputFormat};
use crate::content::{FieldMapping, TextDirection, ViewModel};
use crate::loader::SectionRequest;

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["section", "name"])))]
pub struct ContentCommand {
    /// Website identifier
    #[arg(long)]
    website: String,

    /// Section identifier
    #[arg(long)]
    section: Option<String>,

    /// Section name or type (case-insensitive)
    #[arg(long)]
    name: Option<String>,

    /// Language code; defaults to the website's default language
    #[arg(long)]
    lang: Option<String>,

    /// Output field, as KEY=ELEMENT. ELEMENT may contain {index}, or be _id or createdAt
    #[arg(long = "field", value_name = "KEY=ELEMENT", required = true, value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Items emitted per subsection
    #[arg(long, default_value_t = 1)]
    repeat: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, rule)) if !key.trim().is_empty() && !rule.trim().is_empty() => {
            Ok((key.trim().to_string(), rule.trim().to_string()))
        }
        _ => Err(format!("expected KEY=ELEMENT, got '{raw}'")),
    }
}

impl ContentCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let ctx = CommandContext::load(cli).await?;

        let language = match &self.lang {
            Some(code) => code.clone(),
            None => ctx
                .loader
                .pick_language(&self.website, None)
                .await
                .with_context(|| format!("Failed to determine the language of website {}", self.website))?,
        };

        let request = self.request(&language);
        let items = ctx
            .loader
            .load(&request)
            .await
            .into_result()
            .with_context(|| format!("Failed to load section content in '{language}'"))?;

        match self.format {
            OutputFormat::Json => print_json(items.as_slice()),
            OutputFormat::Text => {
                print_items(&items, &language);
                Ok(())
            }
        }
    }

    fn request(&self, language: &str) -> SectionRequest {
        let mapping = self
            .fields
            .iter()
            .fold(FieldMapping::new(), |mapping, (key, rule)| mapping.field(key.as_str(), rule.as_str()));

        let request = match (&self.section, &self.name) {
            (Some(id), _) => SectionRequest::by_id(&self.website, id, mapping),
            (None, Some(name)) => SectionRequest::by_name(&self.website, name, mapping),
            // clap requires one of the two
            (None, None) => SectionRequest::by_id(&self.website, "", mapping),
        };

        request.view("cli").language(language).repetitions(self.repeat)
    }
}

fn print_items(items: &[ViewModel], language: &str) {
    println!(
        "{} {} ({})",
        "Language:".bold(),
        language,
        TextDirection::of(language).as_str()
    );

    if items.is_empty() {
        println!("{}", "No items".yellow());
        return;
    }

    for item in items {
        println!("\n{} {}", "#".dimmed(), item.order.to_string().cyan());
        for (key, value) in &item.fields {
            println!("  {}: {value}", key.bold());
        }
    }
}
