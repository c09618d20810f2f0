//! Cached loading of section content.
//!
//! [`SectionContentLoader`] is what page code talks to. For one section it
//! fetches the section's items, fetches all of their subsections in a single
//! batched request, and runs the aggregator. The aggregated view models are
//! cached per `(section, website, view, language)`, so switching language
//! computes a separate entry while revisiting a language reuses the old one.
//!
//! Section and language lists are cached the same way, per website.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cms_content::api::HttpContentApi;
//! use cms_content::cache::CacheConfig;
//! use cms_content::content::FieldMapping;
//! use cms_content::loader::{SectionContentLoader, SectionRequest};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let api = HttpContentApi::new("http://localhost:5000/api", std::time::Duration::from_secs(15))?;
//! let loader = SectionContentLoader::new(Arc::new(api), CacheConfig::default(), "en");
//!
//! let request = SectionRequest::by_name("website-1", "services", FieldMapping::new().field("title", "Title"))
//!     .language("ar");
//! let items = loader.load(&request).await.into_result()?;
//! println!("{} services", items.len());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{ContentApi, SubSectionQuery};
use crate::cache::{CacheConfig, Fetcher, QueryCache, QueryKey, QueryObserver, QueryState, fetcher};
use crate::content::{FieldMapping, ViewModel, aggregate, select_language};
use crate::core::ContentError;
use crate::models::{Language, Section};

const CONTENT_ENTITY: &str = "section-content";
const SECTIONS_ENTITY: &str = "sections";
const LANGUAGES_ENTITY: &str = "languages";

/// Shared predicate over aggregated items.
pub type SharedFilter = Arc<dyn Fn(&ViewModel) -> bool + Send + Sync>;

/// How a request names its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionSelector {
    /// Exact section identifier
    Id(String),
    /// Case-insensitive section name or type, resolved from the website's sections
    Name(String),
}

/// One page view's request for section content.
///
/// `view` names the consumer. Requests that share a section, website and
/// language but use a different mapping, repetition count or filter must use
/// different views, since the mapping itself is not part of the cache key.
#[derive(Clone)]
pub struct SectionRequest {
    /// Website that owns the section
    pub website_id: String,
    /// Section to load, by id or by name
    pub section: SectionSelector,
    /// Consumer name; part of the cache key
    pub view: String,
    /// Requested language; the loader's default when `None`
    pub language: Option<String>,
    /// Output fields and the content elements they come from
    pub mapping: FieldMapping,
    /// Items emitted per subsection
    pub repetitions: usize,
    /// Applied to the aggregated items before they are cached
    pub filter: Option<SharedFilter>,
}

impl SectionRequest {
    /// Request a section by identifier.
    pub fn by_id(website_id: impl Into<String>, section_id: impl Into<String>, mapping: FieldMapping) -> Self {
        Self::new(website_id.into(), SectionSelector::Id(section_id.into()), mapping)
    }

    /// Request a section by name or type.
    pub fn by_name(website_id: impl Into<String>, name: impl Into<String>, mapping: FieldMapping) -> Self {
        Self::new(website_id.into(), SectionSelector::Name(name.into()), mapping)
    }

    fn new(website_id: String, section: SectionSelector, mapping: FieldMapping) -> Self {
        Self {
            website_id,
            section,
            view: "default".to_string(),
            language: None,
            mapping,
            repetitions: 1,
            filter: None,
        }
    }

    /// Name the consuming view.
    #[must_use]
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    /// Resolve content in `code`.
    #[must_use]
    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.language = Some(code.into());
        self
    }

    /// Emit `repetitions` items per subsection.
    #[must_use]
    pub const fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Keep only items accepted by `filter`.
    #[must_use]
    pub fn filter(mut self, filter: impl Fn(&ViewModel) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }
}

impl fmt::Debug for SectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionRequest")
            .field("website_id", &self.website_id)
            .field("section", &self.section)
            .field("view", &self.view)
            .field("language", &self.language)
            .field("mapping", &self.mapping)
            .field("repetitions", &self.repetitions)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Cached front end over a [`ContentApi`].
#[derive(Clone)]
pub struct SectionContentLoader {
    api: Arc<dyn ContentApi>,
    default_language: String,
    content: QueryCache<Vec<ViewModel>>,
    sections: QueryCache<Vec<Section>>,
    languages: QueryCache<Vec<Language>>,
}

impl SectionContentLoader {
    /// Create a loader with empty caches.
    pub fn new(api: Arc<dyn ContentApi>, config: CacheConfig, default_language: impl Into<String>) -> Self {
        Self {
            api,
            default_language: default_language.into(),
            content: QueryCache::new(config),
            sections: QueryCache::new(config),
            languages: QueryCache::new(config),
        }
    }

    /// The content cache, for inspection.
    #[must_use]
    pub const fn content_cache(&self) -> &QueryCache<Vec<ViewModel>> {
        &self.content
    }

    /// Load aggregated content for `request`.
    ///
    /// A name selector that matches no section yields
    /// [`ContentError::SectionNotFound`] in the error state.
    pub async fn load(&self, request: &SectionRequest) -> QueryState<Vec<ViewModel>> {
        let section_id = match self.section_id(request).await {
            Ok(id) => id,
            Err(e) => return QueryState::Error(e),
        };

        let key = self.content_key(request, &section_id);
        let fetch = self.content_fetcher(request, section_id);
        self.content.fetch(&key, move || fetch()).await
    }

    /// Load, ignoring freshness.
    pub async fn reload(&self, request: &SectionRequest) -> QueryState<Vec<ViewModel>> {
        let section_id = match self.section_id(request).await {
            Ok(id) => id,
            Err(e) => return QueryState::Error(e),
        };

        let key = self.content_key(request, &section_id);
        let fetch = self.content_fetcher(request, section_id);
        self.content.refetch(&key, move || fetch()).await
    }

    /// A long-lived observer of `request`'s content.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::SectionNotFound`] or a fetch error if a name
    /// selector cannot be resolved.
    pub async fn observe(&self, request: &SectionRequest) -> Result<QueryObserver<Vec<ViewModel>>, ContentError> {
        let section_id = self.section_id(request).await?;
        let key = self.content_key(request, &section_id);
        let fetch = self.content_fetcher(request, section_id);
        Ok(QueryObserver::new(self.content.clone(), key, fetch))
    }

    /// Re-point `observer` at `request` (for example after a language switch).
    ///
    /// # Errors
    ///
    /// Same as [`observe`](Self::observe).
    pub async fn rebind(
        &self,
        observer: &QueryObserver<Vec<ViewModel>>,
        request: &SectionRequest,
    ) -> Result<(), ContentError> {
        let section_id = self.section_id(request).await?;
        let key = self.content_key(request, &section_id);
        observer.set_key(key, self.content_fetcher(request, section_id));
        Ok(())
    }

    /// Published sections of a website.
    pub async fn sections(&self, website_id: &str) -> QueryState<Vec<Section>> {
        self.list_sections(website_id, false).await
    }

    /// Sections of a website, optionally including unpublished ones.
    pub async fn list_sections(&self, website_id: &str, include_inactive: bool) -> QueryState<Vec<Section>> {
        let key = QueryKey::new(SECTIONS_ENTITY, website_id).param("includeInactive", include_inactive);
        let api = Arc::clone(&self.api);
        let website_id = website_id.to_string();

        self.sections
            .fetch(&key, move || {
                let api = Arc::clone(&api);
                let website_id = website_id.clone();
                async move { api.sections(&website_id, include_inactive).await }
            })
            .await
    }

    /// Languages of a website.
    pub async fn languages(&self, website_id: &str) -> QueryState<Vec<Language>> {
        let key = QueryKey::new(LANGUAGES_ENTITY, website_id);
        let api = Arc::clone(&self.api);
        let website_id = website_id.to_string();

        self.languages
            .fetch(&key, move || {
                let api = Arc::clone(&api);
                let website_id = website_id.clone();
                async move { api.languages(&website_id).await }
            })
            .await
    }

    /// Find a section by case-insensitive name or type.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::SectionNotFound`] if nothing matches, or the
    /// error of the section list fetch.
    pub async fn find_section(&self, website_id: &str, name: &str) -> Result<Section, ContentError> {
        let sections = self.sections(website_id).await.into_result()?;
        sections.iter().find(|section| section.matches(name)).cloned().ok_or_else(|| {
            ContentError::SectionNotFound {
                name: name.to_string(),
            }
        })
    }

    /// The language to render for `requested`: the requested code when the
    /// website offers it, otherwise the website default, otherwise the
    /// loader's default.
    ///
    /// # Errors
    ///
    /// Returns the error of the language list fetch.
    pub async fn pick_language(&self, website_id: &str, requested: Option<&str>) -> Result<String, ContentError> {
        let languages = self.languages(website_id).await.into_result()?;
        Ok(select_language(&languages, requested)
            .map_or_else(|| self.default_language.clone(), |language| language.language_id.clone()))
    }

    /// Drop every cached entry belonging to `website_id`. Returns how many
    /// entries were removed.
    pub fn invalidate_website(&self, website_id: &str) -> usize {
        let content = self.content.remove_where(|key| key.get_param("website") == Some(website_id));
        let sections = self.sections.remove_where(|key| key.id() == website_id);
        let languages = self.languages.remove_where(|key| key.id() == website_id);

        let removed = content + sections + languages;
        debug!(website_id, removed, "invalidated website");
        removed
    }

    /// Evict unobserved entries past their GC window in every cache.
    pub fn collect_garbage(&self) -> usize {
        self.content.collect_garbage() + self.sections.collect_garbage() + self.languages.collect_garbage()
    }

    /// Periodically collect garbage in every cache.
    pub fn spawn_gc(&self, interval: Duration) -> Vec<JoinHandle<()>> {
        vec![
            self.content.spawn_gc(interval),
            self.sections.spawn_gc(interval),
            self.languages.spawn_gc(interval),
        ]
    }

    fn language_of<'a>(&'a self, request: &'a SectionRequest) -> &'a str {
        request.language.as_deref().unwrap_or(&self.default_language)
    }

    fn content_key(&self, request: &SectionRequest, section_id: &str) -> QueryKey {
        QueryKey::new(CONTENT_ENTITY, section_id)
            .param("website", &request.website_id)
            .param("view", &request.view)
            .language(self.language_of(request))
    }

    async fn section_id(&self, request: &SectionRequest) -> Result<String, ContentError> {
        match &request.section {
            SectionSelector::Id(id) => Ok(id.clone()),
            SectionSelector::Name(name) => Ok(self.find_section(&request.website_id, name).await?.id),
        }
    }

    fn content_fetcher(&self, request: &SectionRequest, section_id: String) -> Fetcher<Vec<ViewModel>> {
        let api = Arc::clone(&self.api);
        let language = self.language_of(request).to_string();
        let request = request.clone();

        fetcher(move || {
            let api = Arc::clone(&api);
            let request = request.clone();
            let section_id = section_id.clone();
            let language = language.clone();
            async move { fetch_section_content(api.as_ref(), &section_id, &request, &language).await }
        })
    }
}

/// Items, then one batched subsection request, then aggregation.
async fn fetch_section_content(
    api: &dyn ContentApi,
    section_id: &str,
    request: &SectionRequest,
    language: &str,
) -> Result<Vec<ViewModel>, ContentError> {
    let items = api.section_items(section_id).await?;
    let item_ids: Vec<String> = items.into_iter().map(|item| item.id).collect();

    let subsections = api.subsections(&item_ids, SubSectionQuery::default()).await?;
    debug!(
        section_id,
        items = item_ids.len(),
        subsections = subsections.len(),
        language,
        "fetched section content"
    );

    Ok(aggregate(
        &subsections,
        &request.mapping,
        request.repetitions,
        request.filter.as_deref(),
        language,
    ))
}
