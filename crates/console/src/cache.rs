//! Query cache for backend list and profile fetches.
//!
//! Every screen reads through this cache instead of calling the backend
//! directly. The freshness model is deliberate and strict:
//!
//! - Entries **never expire on their own** - there is no TTL. Re-rendering a
//!   screen serves the cached value; the backend is not polled.
//! - The only refresh triggers are an explicit [`QueryCache::invalidate`]
//!   (issued by every successful mutation) or a process restart.
//! - Concurrent fetches for the same key are coalesced into one in-flight
//!   request; callers share its result.
//! - Each key carries a generation counter. Invalidation bumps it, so a
//!   fetch that was already in flight when the invalidation happened may
//!   complete and serve its waiters, but it never installs its stale result
//!   over the newer state - last-write-wins is decided by generation, not by
//!   which request started first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use moka::future::Cache as MokaCache;
use thiserror::Error;

use crate::api::{
    ApiClient, ApiError, Customer, Insurer, Producer, Production, Profile, User,
};

/// Logical query identifiers, one per cached dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Profile,
    Users,
    Customers,
    Producers,
    Insurers,
    Productions,
}

/// Cached value types, one variant per [`QueryKey`].
#[derive(Debug, Clone)]
pub enum CachedValue {
    Profile(Box<Profile>),
    Users(Vec<User>),
    Customers(Vec<Customer>),
    Producers(Vec<Producer>),
    Insurers(Vec<Insurer>),
    Productions(Vec<Production>),
}

/// Errors surfaced by cached fetches.
#[derive(Debug, Error, Clone)]
pub enum FetchError {
    /// The underlying backend request failed. Shared between coalesced
    /// callers, hence the `Arc`.
    #[error(transparent)]
    Api(#[from] Arc<ApiError>),

    /// The entry under this key held a different variant than the key maps
    /// to. Only reachable through a coding error in the typed accessors.
    #[error("cache entry for {0:?} held an unexpected value shape")]
    Shape(QueryKey),
}

impl FetchError {
    /// The notification/screen text for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Shape(_) => "The console hit an internal error. Try again.".to_string(),
        }
    }
}

type FetchResult = Result<CachedValue, Arc<ApiError>>;
type InFlight = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Default)]
struct KeyState {
    /// Bumped by every invalidation; fetches only install results taken at
    /// the current generation.
    generation: u64,
    /// The shared in-flight fetch, tagged with the generation it started at.
    in_flight: Option<(u64, InFlight)>,
}

struct CacheInner {
    store: MokaCache<QueryKey, CachedValue>,
    keys: Mutex<HashMap<QueryKey, KeyState>>,
}

/// Process-wide query cache. Cheap to clone; clones share storage.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    /// Create an empty cache.
    ///
    /// The store is bounded only by entry count; entries have no
    /// time-to-live, matching the invalidation-only freshness model.
    #[must_use]
    pub fn new() -> Self {
        let store = MokaCache::builder().max_capacity(64).build();
        Self {
            inner: Arc::new(CacheInner {
                store,
                keys: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Return the cached value for `key`, joining or starting a fetch on a
    /// miss.
    ///
    /// `fetch` is only polled when this call actually starts the fetch;
    /// when the value is cached or another fetch is already in flight it is
    /// dropped unused.
    ///
    /// # Errors
    ///
    /// Propagates the fetch's `ApiError`, shared between coalesced callers.
    pub async fn get_or_fetch<Fut>(&self, key: QueryKey, fetch: Fut) -> FetchResult
    where
        Fut: Future<Output = Result<CachedValue, ApiError>> + Send + 'static,
    {
        if let Some(value) = self.inner.store.get(&key).await {
            return Ok(value);
        }

        let shared = {
            let mut keys = self.inner.keys.lock().expect("cache key state poisoned");
            let state = keys.entry(key).or_default();

            // Join the in-flight fetch only if it is still current; a fetch
            // from before an invalidation must not satisfy new readers.
            let joinable = match &state.in_flight {
                Some((generation, in_flight)) if *generation == state.generation => {
                    Some(in_flight.clone())
                }
                _ => None,
            };

            if let Some(in_flight) = joinable {
                in_flight
            } else {
                let generation = state.generation;
                let inner = Arc::clone(&self.inner);
                let in_flight: InFlight = async move {
                    let result = fetch.await.map_err(Arc::new);
                    let still_current = {
                        let mut keys = inner.keys.lock().expect("cache key state poisoned");
                        let state = keys.entry(key).or_default();
                        if matches!(&state.in_flight, Some((g, _)) if *g == generation) {
                            state.in_flight = None;
                        }
                        state.generation == generation
                    };
                    let value = result?;
                    if still_current {
                        inner.store.insert(key, value.clone()).await;
                    }
                    Ok(value)
                }
                .boxed()
                .shared();
                state.in_flight = Some((generation, in_flight.clone()));
                in_flight
            }
        };

        shared.await
    }

    /// Mark `key` stale: drop the stored entry and bump the generation so
    /// any fetch already in flight cannot install its result.
    ///
    /// Idempotent - invalidating an already-stale key again still leads to
    /// at most one deduplicated refetch on the next access.
    pub async fn invalidate(&self, key: QueryKey) {
        {
            let mut keys = self.inner.keys.lock().expect("cache key state poisoned");
            keys.entry(key).or_default().generation += 1;
        }
        self.inner.store.invalidate(&key).await;
    }

    /// Cached operator profile (`POST /auth/me`), fetched once per session.
    ///
    /// # Errors
    ///
    /// Propagates the underlying request failure.
    pub async fn profile(&self, api: &ApiClient) -> Result<Profile, FetchError> {
        let api = api.clone();
        let value = self
            .get_or_fetch(QueryKey::Profile, async move {
                api.get_profile()
                    .await
                    .map(|profile| CachedValue::Profile(Box::new(profile)))
            })
            .await?;
        match value {
            CachedValue::Profile(profile) => Ok(*profile),
            _ => Err(FetchError::Shape(QueryKey::Profile)),
        }
    }

    /// Cached staff user list.
    ///
    /// # Errors
    ///
    /// Propagates the underlying request failure.
    pub async fn users(&self, api: &ApiClient) -> Result<Vec<User>, FetchError> {
        let api = api.clone();
        let value = self
            .get_or_fetch(QueryKey::Users, async move {
                api.get_users().await.map(CachedValue::Users)
            })
            .await?;
        match value {
            CachedValue::Users(users) => Ok(users),
            _ => Err(FetchError::Shape(QueryKey::Users)),
        }
    }

    /// Cached customer list.
    ///
    /// # Errors
    ///
    /// Propagates the underlying request failure.
    pub async fn customers(&self, api: &ApiClient) -> Result<Vec<Customer>, FetchError> {
        let api = api.clone();
        let value = self
            .get_or_fetch(QueryKey::Customers, async move {
                api.get_customers().await.map(CachedValue::Customers)
            })
            .await?;
        match value {
            CachedValue::Customers(customers) => Ok(customers),
            _ => Err(FetchError::Shape(QueryKey::Customers)),
        }
    }

    /// Cached producer list.
    ///
    /// # Errors
    ///
    /// Propagates the underlying request failure.
    pub async fn producers(&self, api: &ApiClient) -> Result<Vec<Producer>, FetchError> {
        let api = api.clone();
        let value = self
            .get_or_fetch(QueryKey::Producers, async move {
                api.get_producers().await.map(CachedValue::Producers)
            })
            .await?;
        match value {
            CachedValue::Producers(producers) => Ok(producers),
            _ => Err(FetchError::Shape(QueryKey::Producers)),
        }
    }

    /// Cached insurer list.
    ///
    /// # Errors
    ///
    /// Propagates the underlying request failure.
    pub async fn insurers(&self, api: &ApiClient) -> Result<Vec<Insurer>, FetchError> {
        let api = api.clone();
        let value = self
            .get_or_fetch(QueryKey::Insurers, async move {
                api.get_insurers().await.map(CachedValue::Insurers)
            })
            .await?;
        match value {
            CachedValue::Insurers(insurers) => Ok(insurers),
            _ => Err(FetchError::Shape(QueryKey::Insurers)),
        }
    }

    /// Cached production list.
    ///
    /// # Errors
    ///
    /// Propagates the underlying request failure.
    pub async fn productions(&self, api: &ApiClient) -> Result<Vec<Production>, FetchError> {
        let api = api.clone();
        let value = self
            .get_or_fetch(QueryKey::Productions, async move {
                api.get_productions().await.map(CachedValue::Productions)
            })
            .await?;
        match value {
            CachedValue::Productions(productions) => Ok(productions),
            _ => Err(FetchError::Shape(QueryKey::Productions)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    use super::*;

    fn users_value(names: &[&str]) -> CachedValue {
        let users = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                serde_json::from_value(serde_json::json!({
                    "id": i64::try_from(i).unwrap() + 1,
                    "name": name,
                    "email": format!("{name}@harper.example"),
                    "role": 2,
                    "createdAt": "2026-01-01T00:00:00Z",
                    "updatedAt": "2026-01-01T00:00:00Z",
                }))
                .unwrap()
            })
            .collect();
        CachedValue::Users(users)
    }

    fn user_names(value: &CachedValue) -> Vec<String> {
        match value {
            CachedValue::Users(users) => users.iter().map(|u| u.name.clone()).collect(),
            _ => panic!("expected users"),
        }
    }

    #[tokio::test]
    async fn test_second_access_serves_cached_value_without_refetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = cache
                .get_or_fetch(QueryKey::Users, async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(users_value(&["ana"]))
                })
                .await
                .unwrap();
            assert_eq!(user_names(&value), vec!["ana"]);
        }

        // Remounting the screen alone never refetches.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidation_forces_refetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |names: &'static [&'static str]| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(users_value(names))
            }
        };

        let before = cache
            .get_or_fetch(QueryKey::Users, fetch(&["ana"]))
            .await
            .unwrap();
        assert_eq!(user_names(&before), vec!["ana"]);

        // Without invalidation the list still shows the pre-creation set.
        let stale = cache
            .get_or_fetch(QueryKey::Users, fetch(&["ana", "bia"]))
            .await
            .unwrap();
        assert_eq!(user_names(&stale), vec!["ana"]);

        cache.invalidate(QueryKey::Users).await;

        let fresh = cache
            .get_or_fetch(QueryKey::Users, fetch(&["ana", "bia"]))
            .await
            .unwrap();
        assert_eq!(user_names(&fresh), vec!["ana", "bia"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_coalesced() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let slow_fetch = || {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                Ok(users_value(&["ana"]))
            }
        };

        let first = tokio::spawn({
            let cache = cache.clone();
            let fetch = slow_fetch();
            async move { cache.get_or_fetch(QueryKey::Users, fetch).await }
        });
        tokio::task::yield_now().await;

        let second = tokio::spawn({
            let cache = cache.clone();
            let fetch = slow_fetch();
            async move { cache.get_or_fetch(QueryKey::Users, fetch).await }
        });
        tokio::task::yield_now().await;

        gate.notify_waiters();
        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(user_names(&first), vec!["ana"]);
        assert_eq!(user_names(&second), vec!["ana"]);

        // Both callers shared a single in-flight request.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_in_flight_response_never_overwrites_newer_state() {
        let cache = QueryCache::new();
        let gate = Arc::new(Notify::new());

        // A slow fetch starts before the mutation's invalidation...
        let slow = tokio::spawn({
            let cache = cache.clone();
            let gate = Arc::clone(&gate);
            async move {
                cache
                    .get_or_fetch(QueryKey::Users, async move {
                        gate.notified().await;
                        Ok(users_value(&["stale"]))
                    })
                    .await
            }
        });
        tokio::task::yield_now().await;

        // ...the mutation lands and invalidates...
        cache.invalidate(QueryKey::Users).await;

        // ...then the old response finally arrives.
        gate.notify_waiters();
        let stale = slow.await.unwrap().unwrap();
        assert_eq!(user_names(&stale), vec!["stale"]);

        // The next access must refetch: the stale response was not installed.
        let fresh = cache
            .get_or_fetch(QueryKey::Users, async move { Ok(users_value(&["fresh"])) })
            .await
            .unwrap();
        assert_eq!(user_names(&fresh), vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_double_invalidation_still_single_refetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(users_value(&["ana"]))
            }
        };

        cache
            .get_or_fetch(QueryKey::Users, fetch())
            .await
            .unwrap();

        cache.invalidate(QueryKey::Users).await;
        cache.invalidate(QueryKey::Users).await;

        cache
            .get_or_fetch(QueryKey::Users, fetch())
            .await
            .unwrap();
        cache
            .get_or_fetch(QueryKey::Users, fetch())
            .await
            .unwrap();

        // One fetch before, one after - re-invalidating twice in a row does
        // not double the work.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_is_not_cached() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Api {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    message: None,
                })
            }
        };
        let err = cache.get_or_fetch(QueryKey::Users, failing).await;
        assert!(err.is_err());

        // Retry re-issues the same fetch; errors never populate the cache.
        let ok = cache
            .get_or_fetch(QueryKey::Users, async move { Ok(users_value(&["ana"])) })
            .await
            .unwrap();
        assert_eq!(user_names(&ok), vec!["ana"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = QueryCache::new();

        cache
            .get_or_fetch(QueryKey::Users, async move { Ok(users_value(&["ana"])) })
            .await
            .unwrap();
        cache.invalidate(QueryKey::Customers).await;

        // Invalidating one key leaves the others' entries in place.
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(users_value(&["bia"]))
            }
        };
        let value = cache.get_or_fetch(QueryKey::Users, fetch).await.unwrap();
        assert_eq!(user_names(&value), vec!["ana"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
