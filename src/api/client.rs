//! reqwest-based [`ContentApi`] implementation.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::{ContentApi, SubSectionQuery};
use crate::config::ApiConfig;
use crate::core::ContentError;
use crate::models::{Language, Section, SectionItem, SubSection, Website};

/// List responses come either bare or wrapped in `{ "data": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Envelope<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Client for the CMS REST API.
#[derive(Debug, Clone)]
pub struct HttpContentApi {
    client: Client,
    base_url: String,
}

impl HttpContentApi {
    /// Create a client for `base_url` (for example `http://localhost:5000/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ContentError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| ContentError::Config {
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `[api]` configuration table.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ContentError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    /// The API root all paths are joined to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ContentError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, ?query, "GET {operation}");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ContentError::Fetch {
                operation: operation.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| ContentError::Fetch {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;

        let items = serde_json::from_slice::<Envelope<T>>(&body)
            .map_err(|e| ContentError::Decode {
                url: url.clone(),
                reason: e.to_string(),
            })?
            .into_items();

        trace!(%url, count = items.len(), "decoded response");
        Ok(items)
    }
}

impl ContentApi for HttpContentApi {
    fn websites(&self) -> BoxFuture<'_, Result<Vec<Website>, ContentError>> {
        async move { self.get_list("fetch websites", "websites", &[]).await }.boxed()
    }

    fn languages<'a>(&'a self, website_id: &'a str) -> BoxFuture<'a, Result<Vec<Language>, ContentError>> {
        async move {
            self.get_list("fetch languages", &format!("languages/website/{website_id}"), &[])
                .await
        }
        .boxed()
    }

    fn sections<'a>(
        &'a self,
        website_id: &'a str,
        include_inactive: bool,
    ) -> BoxFuture<'a, Result<Vec<Section>, ContentError>> {
        async move {
            self.get_list(
                "fetch sections",
                &format!("sections/website/{website_id}"),
                &[("includeInactive", include_inactive.to_string())],
            )
            .await
        }
        .boxed()
    }

    fn section_items<'a>(&'a self, section_id: &'a str) -> BoxFuture<'a, Result<Vec<SectionItem>, ContentError>> {
        async move {
            self.get_list("fetch section items", &format!("section-items/section/{section_id}"), &[])
                .await
        }
        .boxed()
    }

    fn subsections<'a>(
        &'a self,
        item_ids: &'a [String],
        query: SubSectionQuery,
    ) -> BoxFuture<'a, Result<Vec<SubSection>, ContentError>> {
        async move {
            if item_ids.is_empty() {
                return Ok(Vec::new());
            }

            let mut params = vec![
                ("ids", item_ids.join(",")),
                ("activeOnly", query.active_only.to_string()),
                ("includeContentCount", query.include_content_count.to_string()),
            ];
            if let Some(limit) = query.limit {
                params.push(("limit", limit.to_string()));
            }
            if let Some(skip) = query.skip {
                params.push(("skip", skip.to_string()));
            }

            self.get_list("fetch subsections", "subsections/section-items", &params).await
        }
        .boxed()
    }
}
