//! Command-line interface for cms-content.
//!
//! The CLI is an operator tool for looking at what the content pipeline
//! produces: which websites, languages and sections the API serves, how a
//! section resolves in a given language, and which CSS variables a theme
//! generates.
//!
//! # Commands
//!
//! - `websites` - list websites
//! - `languages --website ID` - list a website's languages with text direction
//! - `sections --website ID [--include-inactive]` - list a website's sections
//! - `content --website ID (--section ID | --name NAME) --field KEY=ELEMENT...`
//!   - resolve and aggregate a section
//! - `theme --file PATH` - print the variables of a theme record (offline)
//!
//! # Global Options
//!
//! - `-c, --config <PATH>` - config file (default `~/.cms-content/config.toml`)
//! - `--api-url <URL>` - override `api.base_url` (env `CMS_CONTENT_API_URL`)
//! - `-v, --verbose` - debug logging to stderr
//! - `-q, --quiet` - no logging
//!
//! Without `-v`/`-q`, `RUST_LOG` decides the log filter (default `warn`).

mod browse;
mod content;
mod context;
mod theme;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

pub use context::CommandContext;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging
    pub log_level: Option<String>,
    /// Explicit config file path
    pub config_path: Option<PathBuf>,
    /// API base URL override
    pub api_url: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global `tracing` subscriber, writing to stderr.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(level))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Output format of the listing and content commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Parser)]
#[command(
    name = "cms-content",
    about = "Inspect multilingual CMS content, sections and themes",
    version,
    long_about = "cms-content resolves CMS sections into ordered, language-specific view models \
                  and renders theme records as CSS variables."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable all logging
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Content API base URL, overriding the config file
    #[arg(long, global = true, env = "CMS_CONTENT_API_URL")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List websites
    Websites(browse::WebsitesCommand),

    /// List the languages of a website
    Languages(browse::LanguagesCommand),

    /// List the sections of a website
    Sections(browse::SectionsCommand),

    /// Resolve and aggregate a section's content
    Content(content::ContentCommand),

    /// Print the CSS variables of a theme record
    Theme(theme::ThemeCommand),
}

impl Cli {
    /// Run the parsed command.
    ///
    /// # Errors
    ///
    /// Returns the command's error; `main` turns it into a user-facing message.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Derive the [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            api_url: self.api_url.clone(),
        }
    }

    /// Run the command with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Websites(cmd) => cmd.execute(&config).await,
            Commands::Languages(cmd) => cmd.execute(&config).await,
            Commands::Sections(cmd) => cmd.execute(&config).await,
            Commands::Content(cmd) => cmd.execute(&config).await,
            Commands::Theme(cmd) => cmd.execute().await,
        }
    }
}
