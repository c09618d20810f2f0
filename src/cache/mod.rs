//! Keyed, time-bounded query cache with stale-while-revalidate semantics.
//!
//! [`QueryCache`] stores the results of asynchronous content queries under a
//! [`QueryKey`]. It is shared process-wide (cheap to clone) and coordinates
//! every call site that asks for the same key.
//!
//! # Entry lifecycle
//!
//! ```text
//!            first fetch                stale_time elapsed             gc_time unobserved
//! (absent) ───────────────▶ Fresh ───────────────────────▶ Stale ──────────────────────▶ (evicted)
//!                             ▲                              │
//!                             └──── background revalidate ◀──┘
//! ```
//!
//! - **Fresh**: returned without recomputation.
//! - **Stale**: the stored data is returned immediately and one background
//!   refetch is started (stale-while-revalidate).
//! - **Evicted**: [`QueryCache::collect_garbage`] drops entries that have had
//!   no observers for longer than the GC window.
//!
//! # Concurrency
//!
//! - **De-duplication**: while a fetch for a key is in flight, every other
//!   caller awaits the same [`Shared`] future instead of issuing its own.
//! - **Last-resolved-wins**: each fetch gets an increasing generation number;
//!   a result is applied only if no newer generation has already been
//!   applied, so a slow request can never overwrite fresher data.
//! - **Retry**: a failed fetch is retried (once by default) after a short
//!   backoff, then the error becomes the entry's state.
//! - **Detached fetches**: each fetch runs as its own Tokio task. A caller
//!   that stops waiting (a view unmounting, a timeout) does not stall the
//!   key; the result is still stored and later revalidation and eviction
//!   proceed normally. The cache must therefore be used inside a Tokio runtime.
//!
//! The entry map is a [`DashMap`]; no shard lock is held across an `.await`.
//!
//! # Observable state
//!
//! [`QueryState`] is exactly one of loading, success, or error per key. A
//! failed background revalidation keeps serving the previous data.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cms_content::cache::{CacheConfig, QueryCache, QueryKey};
//!
//! # async fn example() {
//! let cache: QueryCache<Vec<String>> = QueryCache::new(CacheConfig::default());
//! let key = QueryKey::new("sections", "website-1").language("en");
//!
//! let state = cache.fetch(&key, || async { Ok(vec!["Hero".to_string()]) }).await;
//! assert_eq!(state.data().map(|d| d.len()), Some(1));
//! # }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, trace, warn};

use crate::constants::{
    DEFAULT_FETCH_RETRIES, DEFAULT_GC_TIME, DEFAULT_RETRY_DELAY_MS, DEFAULT_STALE_TIME,
    MAX_RETRY_DELAY_MS,
};
use crate::core::ContentError;

pub mod key;
pub mod observer;

pub use key::QueryKey;
pub use observer::{Fetcher, QueryObserver, fetcher};

/// Result of one fetch, shared between all waiters.
pub type FetchResult<T> = Result<Arc<T>, ContentError>;

type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

/// Observable state of a query. The three states are mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// No data or error yet; a fetch is pending
    Loading,
    /// Data is available (possibly stale while a refresh runs)
    Success(Arc<T>),
    /// The last fetch failed after retries and no data is available
    Error(ContentError),
}

impl<T> QueryState<T> {
    /// The data, when in the success state.
    #[must_use]
    pub const fn data(&self) -> Option<&Arc<T>> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Whether the query is still loading.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The error, when in the error state.
    #[must_use]
    pub const fn error(&self) -> Option<&ContentError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Convert into a `Result`. Loading maps to an error.
    ///
    /// # Errors
    ///
    /// Returns the stored error, or [`ContentError::Other`] when still loading.
    pub fn into_result(self) -> Result<Arc<T>, ContentError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Error(e) => Err(e),
            Self::Loading => Err(ContentError::Other {
                message: "query is still loading".to_string(),
            }),
        }
    }
}

/// Timing and retry policy of a [`QueryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long data counts as fresh
    pub stale_time: Duration,
    /// How long an unobserved entry is kept
    pub gc_time: Duration,
    /// Retries after a failed fetch
    pub retries: usize,
    /// Delay before the first retry
    pub retry_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            retries: DEFAULT_FETCH_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Hit/miss counters of a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from stored data (fresh or stale)
    pub hits: u64,
    /// Requests that had to wait for a fetch
    pub misses: u64,
    /// Current number of entries
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct Entry<T> {
    data: Option<Arc<T>>,
    error: Option<ContentError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Generation and handle of the most recently issued fetch still running
    in_flight: Option<(u64, SharedFetch<T>)>,
    /// Generation whose result is currently stored; results at or below it are stale
    applied: u64,
    observers: usize,
    last_active: Instant,
}

impl<T> Entry<T> {
    /// `floor` is the cache-wide generation at creation time, so fetches
    /// issued for an earlier incarnation of the key are never applied.
    const fn new(now: Instant, floor: u64) -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            invalidated: false,
            in_flight: None,
            applied: floor,
            observers: 0,
            last_active: now,
        }
    }

    fn is_fresh(&self, now: Instant, stale_time: Duration) -> bool {
        !self.invalidated
            && self.updated_at.is_some_and(|at| now.saturating_duration_since(at) < stale_time)
    }

    fn state(&self) -> QueryState<T> {
        if let Some(data) = &self.data {
            QueryState::Success(Arc::clone(data))
        } else if let Some(e) = &self.error {
            QueryState::Error(e.clone())
        } else {
            QueryState::Loading
        }
    }

    const fn is_settled(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }
}

struct CacheInner<T> {
    entries: DashMap<QueryKey, Entry<T>>,
    config: CacheConfig,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T> CacheInner<T> {
    fn new_entry(&self, now: Instant) -> Entry<T> {
        Entry::new(now, self.generation.load(Ordering::SeqCst))
    }

    /// Store a fetch result unless a newer generation already landed.
    fn apply(&self, key: &QueryKey, generation: u64, result: &FetchResult<T>) {
        let Some(mut entry) = self.entries.get_mut(key) else {
            debug!(%key, "entry evicted before its fetch resolved");
            return;
        };

        if entry.in_flight.as_ref().is_some_and(|(g, _)| *g == generation) {
            entry.in_flight = None;
        }

        if generation <= entry.applied {
            debug!(
                %key,
                generation,
                applied = entry.applied,
                "discarding out-of-order fetch result"
            );
            return;
        }
        entry.applied = generation;

        let now = Instant::now();
        match result {
            Ok(data) => {
                entry.data = Some(Arc::clone(data));
                entry.error = None;
                entry.updated_at = Some(now);
                entry.invalidated = false;
            }
            Err(e) if entry.data.is_some() => {
                warn!(%key, "Revalidation failed, keeping previous data: {e}");
            }
            Err(e) => {
                entry.error = Some(e.clone());
                entry.updated_at = Some(now);
            }
        }
    }

    fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let gc_time = self.config.gc_time;
        let before = self.entries.len();

        self.entries.retain(|key, entry| {
            let keep = entry.observers > 0
                || entry.in_flight.is_some()
                || now.saturating_duration_since(entry.last_active) < gc_time;
            if !keep {
                trace!(%key, "evicting unobserved entry");
            }
            keep
        });

        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            debug!(evicted, "collected cache garbage");
        }
        evicted
    }
}

enum Plan<T> {
    Ready(Arc<T>),
    Revalidate(Arc<T>),
    Wait(SharedFetch<T>),
}

/// Process-wide cache of query results. Clones share the same storage.
pub struct QueryCache<T> {
    inner: Arc<CacheInner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                config,
                generation: AtomicU64::new(0),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    /// The cache's timing and retry policy.
    #[must_use]
    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    /// Get the value for `key`, computing it with `fetcher` when needed.
    ///
    /// - fresh data: returned immediately, `fetcher` is not called
    /// - stale data: returned immediately, a background refetch is started
    ///   unless one is already running
    /// - no data: waits for the in-flight fetch, starting one if necessary
    ///
    /// The returned state reflects the most recently resolved fetch for the key.
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryState<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ContentError>> + Send + 'static,
    {
        let now = Instant::now();
        let stale_time = self.inner.config.stale_time;

        let plan = {
            let mut entry = self.inner.entries.entry(key.clone()).or_insert_with(|| self.inner.new_entry(now));
            entry.last_active = now;

            if let Some(data) = entry.data.clone() {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                if entry.is_fresh(now, stale_time) {
                    trace!(%key, "cache hit");
                    Plan::Ready(data)
                } else if entry.in_flight.is_some() {
                    trace!(%key, "stale hit, revalidation already running");
                    Plan::Revalidate(data)
                } else {
                    debug!(%key, "serving stale data while revalidating");
                    // Runs as its own task; nobody needs to await it
                    let _refresh = self.start_fetch(&mut entry, key, fetcher);
                    Plan::Revalidate(data)
                }
            } else {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                let joined = entry.in_flight.as_ref().map(|(generation, shared)| (*generation, shared.clone()));
                if let Some((generation, shared)) = joined {
                    trace!(%key, generation, "joining in-flight fetch");
                    Plan::Wait(shared)
                } else {
                    debug!(%key, "cache miss");
                    Plan::Wait(self.start_fetch(&mut entry, key, fetcher))
                }
            }
        };

        match plan {
            Plan::Ready(data) => QueryState::Success(data),
            Plan::Revalidate(data) => QueryState::Success(data),
            Plan::Wait(fetch) => {
                let result = fetch.await;
                self.settled_state(key, result)
            }
        }
    }

    /// Force a new fetch for `key` and wait for it, ignoring freshness.
    ///
    /// A fetch already in flight keeps running, but if it resolves after this
    /// one its result is discarded.
    pub async fn refetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryState<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ContentError>> + Send + 'static,
    {
        let now = Instant::now();
        let fetch = {
            let mut entry = self.inner.entries.entry(key.clone()).or_insert_with(|| self.inner.new_entry(now));
            entry.last_active = now;
            self.start_fetch(&mut entry, key, fetcher)
        };

        let result = fetch.await;
        self.settled_state(key, result)
    }

    /// Current state of `key` without fetching. `None` if the key is unknown.
    #[must_use]
    pub fn peek(&self, key: &QueryKey) -> Option<QueryState<T>> {
        self.inner.entries.get(key).map(|entry| entry.state())
    }

    /// Mark `key` stale so the next access revalidates it.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match self.inner.entries.get_mut(key) {
            Some(mut entry) => {
                entry.invalidated = true;
                debug!(%key, "invalidated");
                true
            }
            None => false,
        }
    }

    /// Mark every key matching `predicate` stale. Returns how many matched.
    pub fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let mut count = 0;
        for mut entry in self.inner.entries.iter_mut() {
            if predicate(entry.key()) {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!(count, "invalidated matching entries");
        count
    }

    /// Drop `key` and its data.
    pub fn remove(&self, key: &QueryKey) -> bool {
        self.inner.entries.remove(key).is_some()
    }

    /// Drop every key matching `predicate`. Returns how many were removed.
    ///
    /// Fetches still in flight for a removed key finish without storing
    /// their result.
    pub fn remove_where(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let before = self.inner.entries.len();
        self.inner.entries.retain(|key, _| !predicate(key));
        before.saturating_sub(self.inner.entries.len())
    }

    /// Register an observer of `key`. The entry is not evicted while any
    /// observer guard is alive.
    #[must_use]
    pub fn observe(&self, key: &QueryKey) -> ObserverGuard<T> {
        let now = Instant::now();
        let mut entry = self.inner.entries.entry(key.clone()).or_insert_with(|| self.inner.new_entry(now));
        entry.observers += 1;
        entry.last_active = now;

        ObserverGuard {
            cache: Arc::downgrade(&self.inner),
            key: key.clone(),
        }
    }

    /// Evict entries unobserved for longer than the GC window. Returns the
    /// number of evicted entries.
    pub fn collect_garbage(&self) -> usize {
        self.inner.collect_garbage()
    }

    /// Run [`collect_garbage`](Self::collect_garbage) every `interval` until
    /// the cache is dropped.
    pub fn spawn_gc(&self, interval: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.collect_garbage();
            }
        })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Hit/miss statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            entries: self.inner.entries.len(),
        }
    }

    fn start_fetch<F, Fut>(&self, entry: &mut Entry<T>, key: &QueryKey, fetcher: F) -> SharedFetch<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ContentError>> + Send + 'static,
    {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let weak = Arc::downgrade(&self.inner);
        let config = self.inner.config;
        let key = key.clone();

        // Detached so it completes and clears `in_flight` without any waiter
        let task = tokio::spawn(async move {
            let result = fetch_with_retry(&key, &fetcher, config).await.map(Arc::new);
            if let Some(inner) = weak.upgrade() {
                inner.apply(&key, generation, &result);
            }
            result
        });

        let fetch = async move {
            task.await.unwrap_or_else(|e| {
                Err(ContentError::Other {
                    message: format!("fetch task failed: {e}"),
                })
            })
        }
        .boxed()
        .shared();

        entry.in_flight = Some((generation, fetch.clone()));
        fetch
    }

    fn settled_state(&self, key: &QueryKey, result: FetchResult<T>) -> QueryState<T> {
        match self.inner.entries.get(key) {
            Some(entry) if entry.is_settled() => entry.state(),
            _ => match result {
                Ok(data) => QueryState::Success(data),
                Err(e) => QueryState::Error(e),
            },
        }
    }
}

/// Keeps an entry alive while held. Dropping it starts the GC window.
pub struct ObserverGuard<T> {
    cache: Weak<CacheInner<T>>,
    key: QueryKey,
}

impl<T> ObserverGuard<T> {
    /// The observed key.
    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl<T> Drop for ObserverGuard<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.cache.upgrade()
            && let Some(mut entry) = inner.entries.get_mut(&self.key)
        {
            entry.observers = entry.observers.saturating_sub(1);
            entry.last_active = Instant::now();
        }
    }
}

async fn fetch_with_retry<T, F, Fut>(
    key: &QueryKey,
    fetcher: &F,
    config: CacheConfig,
) -> Result<T, ContentError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ContentError>>,
{
    let delay_ms = u64::try_from(config.retry_delay.as_millis()).unwrap_or(MAX_RETRY_DELAY_MS);
    let strategy = ExponentialBackoff::from_millis(delay_ms)
        .max_delay(Duration::from_millis(MAX_RETRY_DELAY_MS))
        .take(config.retries);

    let mut attempt = 0u32;
    RetryIf::spawn(
        strategy,
        || {
            attempt += 1;
            if attempt > 1 {
                warn!(%key, attempt, "Retrying failed fetch");
            }
            fetcher()
        },
        |e: &ContentError| e.is_retryable(),
    )
    .await
}
