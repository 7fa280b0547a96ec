/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, Duration, Utc};
use connector::ApiResult;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Projects,
    Tasks,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Projects => write!(f, "projects"),
            EntityKind::Tasks => write!(f, "tasks"),
        }
    }
}

/// Identifies one cached list: an entity type, optionally scoped to a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub entity: EntityKind,
    pub parent: Option<Uuid>,
}

impl QueryKey {
    pub fn projects() -> Self {
        Self {
            entity: EntityKind::Projects,
            parent: None,
        }
    }

    pub fn tasks() -> Self {
        Self {
            entity: EntityKind::Tasks,
            parent: None,
        }
    }

    pub fn tasks_of(project_id: Uuid) -> Self {
        Self {
            entity: EntityKind::Tasks,
            parent: Some(project_id),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "{}/{}", self.entity, parent),
            None => write!(f, "{}", self.entity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Fetching,
    Fresh,
    Stale,
    Failed,
}

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: Option<T>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Fetches currently running for this key.
    pub in_flight: usize,
    pub stale: bool,
    pub error: Option<String>,
    // Bumped by every invalidation; a fetch that started before the bump
    // must not mark its result fresh.
    generation: u64,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            data: None,
            updated_at: None,
            in_flight: 0,
            stale: false,
            error: None,
            generation: 0,
        }
    }
}

impl<T> CacheEntry<T> {
    pub fn status(&self, now: DateTime<Utc>, stale_time: Option<Duration>) -> QueryStatus {
        if self.in_flight > 0 {
            return QueryStatus::Fetching;
        }

        if self.error.is_some() {
            return QueryStatus::Failed;
        }

        let Some(updated_at) = self.updated_at else {
            return QueryStatus::Idle;
        };

        let expired = stale_time.is_some_and(|max_age| now - updated_at >= max_age);
        if self.stale || expired {
            QueryStatus::Stale
        } else {
            QueryStatus::Fresh
        }
    }
}

/// Releases one in-flight mark, also when the fetch is dropped midway.
struct FetchGuard<'a, T: Clone> {
    cache: &'a QueryCache<T>,
    key: QueryKey,
}

impl<T: Clone> Drop for FetchGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(entry) = self.cache.lock().get_mut(&self.key) {
            entry.in_flight = entry.in_flight.saturating_sub(1);
        }
    }
}

/// Keyed store of fetched lists and their freshness.
pub struct QueryCache<T> {
    entries: Mutex<HashMap<QueryKey, CacheEntry<T>>>,
    stale_time: Option<Duration>,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(stale_time: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stale_time,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stale_time(&self) -> Option<Duration> {
        self.stale_time
    }

    /// Cached data regardless of freshness.
    pub fn get(&self, key: QueryKey) -> Option<T> {
        self.lock().get(&key).and_then(|entry| entry.data.clone())
    }

    pub fn entry(&self, key: QueryKey) -> Option<CacheEntry<T>> {
        self.lock().get(&key).cloned()
    }

    pub fn status(&self, key: QueryKey) -> QueryStatus {
        self.lock()
            .get(&key)
            .map(|entry| entry.status(Utc::now(), self.stale_time))
            .unwrap_or(QueryStatus::Idle)
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        self.lock().keys().copied().collect()
    }

    /// Seeds an entry as freshly fetched.
    pub fn set(&self, key: QueryKey, data: T) {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        entry.data = Some(data);
        entry.updated_at = Some(Utc::now());
        entry.stale = false;
        entry.error = None;
    }

    /// Marks every key of `entity` stale and returns how many there were.
    pub fn invalidate(&self, entity: EntityKind) -> usize {
        let mut entries = self.lock();
        let mut count = 0;

        for (_, entry) in entries.iter_mut().filter(|(key, _)| key.entity == entity) {
            entry.stale = true;
            entry.generation += 1;
            count += 1;
        }

        debug!(%entity, count, "invalidated cached lists");
        count
    }

    pub fn invalidate_key(&self, key: QueryKey) -> bool {
        match self.lock().get_mut(&key) {
            Some(entry) => {
                entry.stale = true;
                entry.generation += 1;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, key: QueryKey) -> Option<T> {
        self.lock().remove(&key).and_then(|entry| entry.data)
    }

    /// Returns the cached data while it is fresh, otherwise runs `fetcher`
    /// and records its outcome. A failed fetch keeps the previous data.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let generation = {
            let mut entries = self.lock();
            let entry = entries.entry(key).or_default();

            if entry.status(Utc::now(), self.stale_time) == QueryStatus::Fresh {
                if let Some(data) = &entry.data {
                    debug!(%key, "serving fresh data from cache");
                    return Ok(data.clone());
                }
            }

            entry.in_flight += 1;
            entry.generation
        };

        let guard = FetchGuard { cache: self, key };

        debug!(%key, "fetching");
        let result = fetcher().await;
        drop(guard);

        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();

        match &result {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.updated_at = Some(Utc::now());
                entry.error = None;
                entry.stale = entry.generation != generation;
            }
            Err(e) => {
                warn!(%key, error = %e, "fetch failed");
                entry.error = Some(e.to_string());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connector::ApiError;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_fetch_caches_until_invalidated() {
        let cache = QueryCache::<Vec<u32>>::new(None);
        let key = QueryKey::projects();
        assert_eq!(cache.status(key), QueryStatus::Idle);

        let first = cache.fetch(key, || async { Ok(vec![1]) }).await.unwrap();
        assert_eq!(first, vec![1]);
        assert_eq!(cache.status(key), QueryStatus::Fresh);

        let cached = cache.fetch(key, || async { Ok(vec![2]) }).await.unwrap();
        assert_eq!(cached, vec![1]);

        assert_eq!(cache.invalidate(EntityKind::Projects), 1);
        assert_eq!(cache.status(key), QueryStatus::Stale);

        let refetched = cache.fetch(key, || async { Ok(vec![2]) }).await.unwrap();
        assert_eq!(refetched, vec![2]);
        assert_eq!(cache.status(key), QueryStatus::Fresh);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_data() {
        let cache = QueryCache::<Vec<u32>>::new(None);
        let key = QueryKey::tasks();
        cache.set(key, vec![7]);
        cache.invalidate(EntityKind::Tasks);

        let result = cache
            .fetch(key, || async { Err(ApiError::Validation("boom".into())) })
            .await;
        assert!(result.is_err());

        let entry = cache.entry(key).unwrap();
        assert_eq!(entry.data, Some(vec![7]));
        assert_eq!(entry.error.as_deref(), Some("boom"));
        assert_eq!(cache.status(key), QueryStatus::Failed);
    }

    #[test]
    fn test_invalidate_scopes_to_entity() {
        let cache = QueryCache::<Vec<u32>>::new(None);
        let project_id = Uuid::new_v4();
        cache.set(QueryKey::tasks(), vec![]);
        cache.set(QueryKey::tasks_of(project_id), vec![]);
        cache.set(QueryKey::projects(), vec![]);

        assert_eq!(cache.invalidate(EntityKind::Tasks), 2);
        assert_eq!(cache.status(QueryKey::tasks()), QueryStatus::Stale);
        assert_eq!(cache.status(QueryKey::tasks_of(project_id)), QueryStatus::Stale);
        assert_eq!(cache.status(QueryKey::projects()), QueryStatus::Fresh);
    }

    #[test]
    fn test_stale_time_expires_entries() {
        let now = Utc::now();
        let entry = CacheEntry {
            data: Some(()),
            updated_at: Some(now - Duration::seconds(30)),
            ..Default::default()
        };

        assert_eq!(entry.status(now, None), QueryStatus::Fresh);
        assert_eq!(entry.status(now, Some(Duration::seconds(60))), QueryStatus::Fresh);
        assert_eq!(entry.status(now, Some(Duration::seconds(10))), QueryStatus::Stale);
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_leaves_result_stale() {
        let cache = QueryCache::<Vec<u32>>::new(None);
        let key = QueryKey::projects();
        cache.set(key, vec![1]);
        cache.invalidate(EntityKind::Projects);

        let result = cache
            .fetch(key, || async {
                assert_eq!(cache.status(key), QueryStatus::Fetching);
                cache.invalidate(EntityKind::Projects);
                Ok(vec![2])
            })
            .await
            .unwrap();

        assert_eq!(result, vec![2]);
        assert_eq!(cache.status(key), QueryStatus::Stale);
    }

    #[tokio::test]
    async fn test_overlapping_fetches_stay_fetching() {
        let cache = QueryCache::<Vec<u32>>::new(None);
        let key = QueryKey::projects();
        let (started_tx, started_rx) = oneshot::channel::<()>();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let slow = cache.fetch(key, || async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok(vec![1])
        });

        let fast = async {
            started_rx.await.unwrap();

            let data = cache.fetch(key, || async { Ok(vec![2]) }).await.unwrap();
            assert_eq!(data, vec![2]);
            assert_eq!(cache.status(key), QueryStatus::Fetching);
            assert_eq!(cache.entry(key).unwrap().in_flight, 1);

            release_tx.send(()).unwrap();
        };

        let (slow, ()) = tokio::join!(slow, fast);

        assert_eq!(slow.unwrap(), vec![1]);
        assert_eq!(cache.get(key), Some(vec![1]));
        assert_eq!(cache.status(key), QueryStatus::Fresh);
    }

    #[tokio::test]
    async fn test_dropped_fetch_releases_in_flight_mark() {
        let cache = QueryCache::<Vec<u32>>::new(None);
        let key = QueryKey::tasks();
        let (_release, parked) = oneshot::channel::<()>();

        let mut fetch = Box::pin(cache.fetch(key, || async move {
            let _ = parked.await;
            Ok(vec![1])
        }));

        tokio::select! {
            biased;
            _ = &mut fetch => unreachable!("fetch is parked"),
            _ = std::future::ready(()) => {}
        }
        assert_eq!(cache.status(key), QueryStatus::Fetching);

        drop(fetch);
        assert_eq!(cache.entry(key).unwrap().in_flight, 0);
        assert_eq!(cache.status(key), QueryStatus::Idle);
    }

    #[test]
    fn test_key_display() {
        let id = Uuid::nil();
        assert_eq!(QueryKey::projects().to_string(), "projects");
        assert_eq!(
            QueryKey::tasks_of(id).to_string(),
            format!("tasks/{}", id)
        );
    }
}
