//! In-memory content API.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use crate::api::{ContentApi, SubSectionQuery};
use crate::core::ContentError;
use crate::models::{Language, Section, SectionItem, SubSection, Website};

/// A [`ContentApi`] serving fixed data.
///
/// Every operation counts its calls. [`fail_next`](Self::fail_next) makes
/// the next calls (of any operation) fail with a retryable
/// [`ContentError::Fetch`], and [`with_latency`](Self::with_latency) delays
/// every response.
#[derive(Debug, Default)]
pub struct MockContentApi {
    websites: Vec<Website>,
    languages: Vec<(String, Language)>,
    sections: Vec<(String, Section)>,
    items: Vec<SectionItem>,
    subsections: Vec<(String, SubSection)>,
    latency: Option<Duration>,
    failures: AtomicUsize,
    website_calls: AtomicUsize,
    language_calls: AtomicUsize,
    section_calls: AtomicUsize,
    section_item_calls: AtomicUsize,
    subsection_calls: AtomicUsize,
    last_subsection_query: Mutex<Option<(Vec<String>, SubSectionQuery)>>,
}

impl MockContentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_website(mut self, id: &str, name: &str) -> Self {
        self.websites.push(Website {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
        });
        self
    }

    /// Add an active language to a website.
    pub fn with_language(mut self, website_id: &str, code: &str, is_default: bool) -> Self {
        self.languages.push((
            website_id.to_string(),
            Language {
                language_id: code.to_string(),
                language: code.to_uppercase(),
                is_active: true,
                is_default,
            },
        ));
        self
    }

    /// Add an active section to a website.
    pub fn with_section(self, website_id: &str, section_id: &str, name: &str) -> Self {
        self.with_section_record(
            website_id,
            Section {
                id: section_id.to_string(),
                name: name.to_string(),
                section_type: None,
                is_active: true,
                order: 0,
            },
        )
    }

    pub fn with_section_record(mut self, website_id: &str, section: Section) -> Self {
        self.sections.push((website_id.to_string(), section));
        self
    }

    /// Add an item to a section.
    pub fn with_item(mut self, section_id: &str, item_id: &str) -> Self {
        self.items.push(SectionItem {
            id: item_id.to_string(),
            name: item_id.to_string(),
            section_id: Some(section_id.to_string()),
            is_active: true,
            order: i64::try_from(self.items.len()).unwrap_or_default(),
        });
        self
    }

    /// Attach a subsection to an item.
    pub fn with_subsection(mut self, item_id: &str, mut subsection: SubSection) -> Self {
        subsection.section_item_id = Some(item_id.to_string());
        self.subsections.push((item_id.to_string(), subsection));
        self
    }

    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next `count` calls.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn website_calls(&self) -> usize {
        self.website_calls.load(Ordering::SeqCst)
    }

    pub fn language_calls(&self) -> usize {
        self.language_calls.load(Ordering::SeqCst)
    }

    pub fn section_calls(&self) -> usize {
        self.section_calls.load(Ordering::SeqCst)
    }

    pub fn section_item_calls(&self) -> usize {
        self.section_item_calls.load(Ordering::SeqCst)
    }

    pub fn subsection_calls(&self) -> usize {
        self.subsection_calls.load(Ordering::SeqCst)
    }

    /// Item ids and options of the most recent subsection request.
    pub fn last_subsection_query(&self) -> Option<(Vec<String>, SubSectionQuery)> {
        self.last_subsection_query.lock().ok().and_then(|guard| guard.clone())
    }

    async fn begin(&self, counter: &AtomicUsize, operation: &str) -> Result<(), ContentError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ContentError::Fetch {
                operation: operation.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl ContentApi for MockContentApi {
    fn websites(&self) -> BoxFuture<'_, Result<Vec<Website>, ContentError>> {
        async move {
            self.begin(&self.website_calls, "fetch websites").await?;
            Ok(self.websites.clone())
        }
        .boxed()
    }

    fn languages<'a>(&'a self, website_id: &'a str) -> BoxFuture<'a, Result<Vec<Language>, ContentError>> {
        async move {
            self.begin(&self.language_calls, "fetch languages").await?;
            Ok(self
                .languages
                .iter()
                .filter(|(website, _)| website == website_id)
                .map(|(_, language)| language.clone())
                .collect())
        }
        .boxed()
    }

    fn sections<'a>(
        &'a self,
        website_id: &'a str,
        include_inactive: bool,
    ) -> BoxFuture<'a, Result<Vec<Section>, ContentError>> {
        async move {
            self.begin(&self.section_calls, "fetch sections").await?;
            Ok(self
                .sections
                .iter()
                .filter(|(website, section)| {
                    website == website_id && (include_inactive || section.is_active)
                })
                .map(|(_, section)| section.clone())
                .collect())
        }
        .boxed()
    }

    fn section_items<'a>(&'a self, section_id: &'a str) -> BoxFuture<'a, Result<Vec<SectionItem>, ContentError>> {
        async move {
            self.begin(&self.section_item_calls, "fetch section items").await?;
            Ok(self
                .items
                .iter()
                .filter(|item| item.section_id.as_deref() == Some(section_id))
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn subsections<'a>(
        &'a self,
        item_ids: &'a [String],
        query: SubSectionQuery,
    ) -> BoxFuture<'a, Result<Vec<SubSection>, ContentError>> {
        async move {
            self.begin(&self.subsection_calls, "fetch subsections").await?;
            if let Ok(mut last) = self.last_subsection_query.lock() {
                *last = Some((item_ids.to_vec(), query));
            }

            let matching = item_ids.iter().flat_map(|id| {
                self.subsections
                    .iter()
                    .filter(move |(item, sub)| item == id && (!query.active_only || sub.is_active))
                    .map(|(_, sub)| sub.clone())
            });

            Ok(matching
                .skip(query.skip.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .collect())
        }
        .boxed()
    }
}
