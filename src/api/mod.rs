//! Access to the CMS content API.
//!
//! [`ContentApi`] is the seam between the content pipeline and the network.
//! [`HttpContentApi`] talks to the real REST service; tests substitute an
//! in-memory implementation.
//!
//! Implementations do not retry. A failed call returns its [`ContentError`]
//! and the query cache decides whether to try again.

use futures::future::BoxFuture;

use crate::core::ContentError;
use crate::models::{Language, Section, SectionItem, SubSection, Website};

mod client;

pub use client::HttpContentApi;

/// Options of a batched subsection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSectionQuery {
    /// Only return published subsections
    pub active_only: bool,
    /// Maximum number of subsections
    pub limit: Option<usize>,
    /// Number of subsections to skip
    pub skip: Option<usize>,
    /// Ask the API to include per-item content counts
    pub include_content_count: bool,
}

impl Default for SubSectionQuery {
    fn default() -> Self {
        Self {
            active_only: true,
            limit: None,
            skip: None,
            include_content_count: false,
        }
    }
}

/// Read-only operations of the CMS content API.
///
/// Every method returns a boxed `Send` future so implementations can be used
/// behind `Arc<dyn ContentApi>` from spawned tasks.
pub trait ContentApi: Send + Sync {
    /// All websites.
    fn websites(&self) -> BoxFuture<'_, Result<Vec<Website>, ContentError>>;

    /// Languages enabled for a website.
    fn languages<'a>(&'a self, website_id: &'a str) -> BoxFuture<'a, Result<Vec<Language>, ContentError>>;

    /// Sections of a website, optionally including unpublished ones.
    fn sections<'a>(
        &'a self,
        website_id: &'a str,
        include_inactive: bool,
    ) -> BoxFuture<'a, Result<Vec<Section>, ContentError>>;

    /// Items of a section.
    fn section_items<'a>(&'a self, section_id: &'a str) -> BoxFuture<'a, Result<Vec<SectionItem>, ContentError>>;

    /// Subsections of several section items in one request.
    fn subsections<'a>(
        &'a self,
        item_ids: &'a [String],
        query: SubSectionQuery,
    ) -> BoxFuture<'a, Result<Vec<SubSection>, ContentError>>;
}
