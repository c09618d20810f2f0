//! Per-consumer view of a cached query.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use super::{ObserverGuard, QueryCache, QueryKey, QueryState};
use crate::core::ContentError;

/// Type-erased fetch function bound to a key.
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ContentError>> + Send + Sync>;

/// Box a closure into a [`Fetcher`].
pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ContentError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

struct Binding<T> {
    key: QueryKey,
    fetcher: Fetcher<T>,
    epoch: u64,
    _guard: ObserverGuard<T>,
}

/// A consumer bound to one key at a time.
///
/// While the observer lives, its entry is exempt from garbage collection.
/// When the key changes (for example, the user switches language) any result
/// still pending for the previous key is discarded instead of being reported.
pub struct QueryObserver<T> {
    cache: QueryCache<T>,
    binding: Mutex<Binding<T>>,
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    /// Observe `key` in `cache`, fetching with `fetcher`.
    pub fn new(cache: QueryCache<T>, key: QueryKey, fetcher: Fetcher<T>) -> Self {
        let guard = cache.observe(&key);
        Self {
            cache,
            binding: Mutex::new(Binding {
                key,
                fetcher,
                epoch: 0,
                _guard: guard,
            }),
        }
    }

    fn binding(&self) -> MutexGuard<'_, Binding<T>> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The key currently observed.
    pub fn key(&self) -> QueryKey {
        self.binding().key.clone()
    }

    /// Switch to another key. Pending results for the old key are dropped.
    pub fn set_key(&self, key: QueryKey, fetcher: Fetcher<T>) {
        let guard = self.cache.observe(&key);
        let mut binding = self.binding();
        if binding.key != key {
            debug!(from = %binding.key, to = %key, "observer switched key");
        }
        binding.key = key;
        binding.fetcher = fetcher;
        binding.epoch += 1;
        // Dropping the previous guard starts the old entry's GC window
        binding._guard = guard;
    }

    /// Current state without fetching.
    pub fn state(&self) -> QueryState<T> {
        let key = self.key();
        self.cache.peek(&key).unwrap_or(QueryState::Loading)
    }

    /// Fetch through the cache.
    ///
    /// Returns `None` when the observer moved to another key before the
    /// result arrived.
    pub async fn load(&self) -> Option<QueryState<T>> {
        let (key, fetch, epoch) = self.snapshot();
        let state = self.cache.fetch(&key, move || fetch()).await;
        self.current(epoch, &key).then_some(state)
    }

    /// Force a refetch, ignoring freshness.
    pub async fn refetch(&self) -> Option<QueryState<T>> {
        let (key, fetch, epoch) = self.snapshot();
        let state = self.cache.refetch(&key, move || fetch()).await;
        self.current(epoch, &key).then_some(state)
    }

    /// Mark the observed entry stale.
    pub fn invalidate(&self) -> bool {
        let key = self.key();
        self.cache.invalidate(&key)
    }

    fn snapshot(&self) -> (QueryKey, Fetcher<T>, u64) {
        let binding = self.binding();
        (binding.key.clone(), Arc::clone(&binding.fetcher), binding.epoch)
    }

    fn current(&self, epoch: u64, key: &QueryKey) -> bool {
        let current = self.binding().epoch == epoch;
        if !current {
            debug!(%key, "discarding result for superseded key");
        }
        current
    }
}
