use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};

/// Cache key namespaces for provider lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Metadata resolution by title and optional year hint.
    Resolve(String, Option<i32>),
    /// Streaming availability by provider-native ID.
    Availability(u64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Resolve(title, Some(year)) => {
                write!(f, "resolve:{}:{}", title.to_lowercase(), year)
            }
            CacheKey::Resolve(title, None) => write!(f, "resolve:{}", title.to_lowercase()),
            CacheKey::Availability(id) => write!(f, "avail:{}", id),
        }
    }
}

struct CacheEntry {
    json: String,
    expires_at: Instant,
}

/// In-process TTL cache for provider lookups.
///
/// Values round-trip through JSON so heterogeneous types share one store and
/// cached data stays decoupled from in-memory representation. Expired entries
/// are dropped lazily on the next read of their key.
#[derive(Clone, Default)]
pub struct Cache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a value from the cache by key.
    ///
    /// Returns `None` for unknown and expired keys. Deserialization failures
    /// surface as internal errors rather than silently dropping data.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let composite = key.to_string();

        {
            let entries = read_lock(&self.entries);
            match entries.get(&composite) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    let data = serde_json::from_str(&entry.json).map_err(|e| {
                        AppError::Internal(format!("Cache deserialization error: {}", e))
                    })?;
                    return Ok(Some(data));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Entry was present but expired: evict it under the write lock.
        let mut entries = write_lock(&self.entries);
        if let Some(entry) = entries.get(&composite) {
            if entry.expires_at <= Instant::now() {
                entries.remove(&composite);
            }
        }
        Ok(None)
    }

    /// Stores a value under the key with a time-to-live in seconds.
    /// Serialization failures are logged and the store is skipped.
    pub fn store<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let mut entries = write_lock(&self.entries);
        entries.insert(
            key.to_string(),
            CacheEntry {
                json,
                expires_at: Instant::now() + Duration::from_secs(ttl),
            },
        );
    }
}

fn read_lock(
    entries: &RwLock<HashMap<String, CacheEntry>>,
) -> std::sync::RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
    entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock(
    entries: &RwLock<HashMap<String, CacheEntry>>,
) -> std::sync::RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
    entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A macro to simplify cache-aside logic.
///
/// Checks whether a value is present in the cache. If found, it returns the
/// cached value. If not, it executes the provided block to compute the value,
/// stores it, and returns it. Errors from the block propagate uncached, so a
/// failed computation never poisons the cache.
///
/// # Arguments
/// * `$cache`: The cache instance; must expose `get_from_cache` and `store`.
/// * `$key`: The key to cache the value under.
/// * `$ttl`: The time-to-live for the cached value in seconds.
/// * `$block`: The future to await when the value is not cached.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.store(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_resolve() {
        let key = CacheKey::Resolve("Inception".to_string(), None);
        assert_eq!(format!("{}", key), "resolve:inception");
    }

    #[test]
    fn test_cache_key_display_resolve_with_year() {
        let key = CacheKey::Resolve("The Matrix".to_string(), Some(1999));
        assert_eq!(format!("{}", key), "resolve:the matrix:1999");
    }

    #[test]
    fn test_cache_key_display_availability() {
        let key = CacheKey::Availability(27205);
        assert_eq!(format!("{}", key), "avail:27205");
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = Cache::new();
        let key = CacheKey::Resolve("nothing here".to_string(), None);
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let cache = Cache::new();
        let key = CacheKey::Resolve("heat".to_string(), Some(1995));
        let value = vec!["item1".to_string(), "item2".to_string()];

        cache.store(&key, &value, 60);

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = Cache::new();
        let key = CacheKey::Availability(1);

        cache.store(&key, &"value".to_string(), 0);

        let retrieved: Option<String> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, None);

        // The expired entry is also evicted from the map.
        assert!(read_lock(&cache.entries).is_empty());
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_value() {
        let cache = Cache::new();
        let key = CacheKey::Availability(2);

        cache.store(&key, &"first".to_string(), 60);
        cache.store(&key, &"second".to_string(), 60);

        let retrieved: Option<String> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let cache = Cache::new();
        cache.store(&CacheKey::Availability(1), &"one".to_string(), 60);
        cache.store(&CacheKey::Availability(2), &"two".to_string(), 60);

        let one: Option<String> = cache
            .get_from_cache(&CacheKey::Availability(1))
            .await
            .unwrap();
        assert_eq!(one, Some("one".to_string()));
    }

    #[tokio::test]
    async fn test_macro_computes_once_then_serves_cached() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let cache = Cache::new();
        let key = CacheKey::Resolve("macro test".to_string(), None);
        let calls = AtomicUsize::new(0);

        async fn run(
            cache: &Cache,
            key: &CacheKey,
            calls: &AtomicUsize,
        ) -> AppResult<String> {
            cached!(cache, key.clone(), 60, async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, AppError>("computed".to_string())
            })
        }

        assert_eq!(run(&cache, &key, &calls).await.unwrap(), "computed");
        assert_eq!(run(&cache, &key, &calls).await.unwrap(), "computed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_macro_propagates_errors_uncached() {
        let cache = Cache::new();
        let key = CacheKey::Resolve("error case".to_string(), None);

        async fn run(cache: &Cache, key: &CacheKey) -> AppResult<String> {
            cached!(cache, key.clone(), 60, async {
                Err::<String, _>(AppError::ExternalApi("boom".to_string()))
            })
        }

        assert!(run(&cache, &key).await.is_err());
        let cached_value: Option<String> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(cached_value, None);
    }
}
