//! Shared setup of the networked commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use super::CliConfig;
use crate::api::HttpContentApi;
use crate::config::ClientConfig;
use crate::loader::SectionContentLoader;

/// Configuration, API client and loader of one CLI invocation.
pub struct CommandContext {
    pub config: ClientConfig,
    pub api: Arc<HttpContentApi>,
    pub loader: SectionContentLoader,
}

impl CommandContext {
    /// Load the config file, apply overrides and build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or is invalid.
    pub async fn load(cli: &CliConfig) -> Result<Self> {
        let mut config = ClientConfig::load_with_optional(cli.config_path.clone()).await?;
        if let Some(url) = &cli.api_url {
            config.api.base_url.clone_from(url);
        }
        config.validate().context("Invalid configuration")?;

        let api = Arc::new(HttpContentApi::from_config(&config.api)?);
        debug!(base_url = api.base_url(), "using content API");

        let loader = SectionContentLoader::new(api.clone(), config.cache_config(), &config.default_language);

        Ok(Self {
            config,
            api,
            loader,
        })
    }
}
