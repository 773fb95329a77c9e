//! Link cache - memoizes presigned download URLs per object key
//!
//! One cache is built at startup and shared by every request through an
//! `Arc`. Entries are served only while `now < expires_at`; a miss or an
//! expired hit recomputes. Growth is bounded by `max_entries` and by a
//! background sweep of expired entries.

use log::debug;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A full cache evicts `max_entries / EVICTION_DIVISOR` entries per miss.
const EVICTION_DIVISOR: usize = 10;

#[derive(Debug, Clone)]
struct CacheEntry {
    url: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct LinkCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl LinkCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Cached URL for `key`, if one exists and has not expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(Instant::now()))
            .map(|entry| entry.url.clone())
    }

    /// Return the cached URL for `key`, or run `compute` and cache its result
    /// for `ttl`.
    ///
    /// Nothing is stored when `compute` fails or its future is dropped before
    /// completing. Two callers racing on the same key may both compute; the
    /// last insert wins.
    pub async fn get_or_create<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(url) = self.get(key) {
            return Ok(url);
        }

        let url = compute().await?;
        self.insert(key, url.clone(), Instant::now() + ttl);
        Ok(url)
    }

    fn insert(&self, key: &str, url: String, expires_at: Instant) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            let now = Instant::now();
            entries.retain(|_, entry| entry.is_fresh(now));

            if entries.len() >= self.max_entries {
                // Evict a tenth at once so a full cache is not rescanned on
                // every miss.
                let batch = (self.max_entries / EVICTION_DIVISOR)
                    .max(entries.len() + 1 - self.max_entries);
                let mut by_expiry: Vec<(Instant, String)> = entries
                    .iter()
                    .map(|(k, entry)| (entry.expires_at, k.clone()))
                    .collect();
                if batch < by_expiry.len() {
                    by_expiry.select_nth_unstable_by_key(batch - 1, |(at, _)| *at);
                    by_expiry.truncate(batch);
                }
                for (_, victim) in by_expiry {
                    entries.remove(&victim);
                }
                debug!("link_cache: evicted {} entries closest to expiry", batch);
            }
        }

        entries.insert(key.to_string(), CacheEntry { url, expires_at });
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Periodically purge expired entries until the cache is dropped.
pub fn spawn_sweeper(cache: &Arc<LinkCache>, interval: Duration) -> JoinHandle<()> {
    let cache = Arc::downgrade(cache);
    let interval = interval.max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(cache) = cache.upgrade() else {
                break;
            };
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!(
                    "link_cache: purged {} expired entries, {} remaining",
                    purged,
                    cache.len()
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(900);

    async fn counted(counter: &AtomicUsize) -> Result<String, String> {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://signed/{}", n))
    }

    #[tokio::test(start_paused = true)]
    async fn second_lookup_within_ttl_reuses_url() {
        let cache = LinkCache::new(16);
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_create("a", TTL, || counted(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(899)).await;
        let second = cache.get_or_create("a", TTL, || counted(&calls)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_recomputed() {
        let cache = LinkCache::new(16);
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_create("a", TTL, || counted(&calls)).await.unwrap();
        tokio::time::advance(TTL).await;
        assert!(cache.get("a").is_none());

        let second = cache.get_or_create("a", TTL, || counted(&calls)).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_compute_is_not_cached() {
        let cache = LinkCache::new(16);
        let result: Result<String, String> = cache
            .get_or_create("a", TTL, || async { Err("backend down".to_string()) })
            .await;

        assert_eq!(result.unwrap_err(), "backend down");
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_compute_leaves_no_entry() {
        let cache = LinkCache::new(16);
        let slow = cache.get_or_create("a", TTL, || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, String>("late".to_string())
        });

        assert!(tokio::time::timeout(Duration::from_secs(1), slow).await.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_entry_closest_to_expiry() {
        let cache = LinkCache::new(2);
        let calls = AtomicUsize::new(0);

        cache
            .get_or_create("short", Duration::from_secs(10), || counted(&calls))
            .await
            .unwrap();
        cache.get_or_create("long", TTL, || counted(&calls)).await.unwrap();
        cache.get_or_create("new", TTL, || counted(&calls)).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("short").is_none());
        assert!(cache.get("long").is_some());
        assert!(cache.get("new").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_a_batch_in_one_pass() {
        let cache = LinkCache::new(20);
        let calls = AtomicUsize::new(0);

        for i in 0..20u64 {
            let key = format!("k{:02}", i);
            cache
                .get_or_create(&key, Duration::from_secs(100 + i), || counted(&calls))
                .await
                .unwrap();
        }
        cache.get_or_create("fresh", TTL, || counted(&calls)).await.unwrap();

        assert_eq!(cache.len(), 19);
        assert!(cache.get("k00").is_none());
        assert!(cache.get("k01").is_none());
        assert!(cache.get("k02").is_some());
        assert!(cache.get("fresh").is_some());

        // Room was made for the next miss too.
        cache.get_or_create("another", TTL, || counted(&calls)).await.unwrap();
        assert_eq!(cache.len(), 20);
        assert!(cache.get("k02").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_purges_expired_entries() {
        let cache = Arc::new(LinkCache::new(16));
        let calls = AtomicUsize::new(0);
        cache
            .get_or_create("a", Duration::from_secs(1), || counted(&calls))
            .await
            .unwrap();

        let handle = spawn_sweeper(&cache, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(cache.is_empty());
        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_share_one_entry() {
        let cache = Arc::new(LinkCache::new(16));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_create("shared", TTL, || async move { counted(&calls).await })
                        .await
                })
            })
            .collect();

        for task in tasks {
            let url = task.await.unwrap().unwrap();
            assert!(url.starts_with("https://signed/"));
        }

        let computed = calls.load(Ordering::SeqCst);
        assert!((1..=8).contains(&computed));
        assert_eq!(cache.len(), 1);
    }
}
