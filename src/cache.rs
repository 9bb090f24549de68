use std::{collections::HashMap, future::Future, str::FromStr, sync::Arc};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{error::AppResult, models::now_sec};

/// Named read paths whose results are memoised. Invalidation is by tag only.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CacheTag {
    Home,
    FeaturedGames,
    FeaturedBoardGames,
    Media,
}

impl CacheTag {
    pub const ALL: [CacheTag; 4] =
        [CacheTag::Home, CacheTag::FeaturedGames, CacheTag::FeaturedBoardGames, CacheTag::Media];

    pub fn as_str(self) -> &'static str {
        match self {
            CacheTag::Home => "home",
            CacheTag::FeaturedGames => "featured-games",
            CacheTag::FeaturedBoardGames => "featured-board-games",
            CacheTag::Media => "media",
        }
    }
}

impl FromStr for CacheTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheTag::ALL.into_iter().find(|t| t.as_str() == s.trim()).ok_or_else(|| s.to_string())
    }
}

struct Entry {
    value: Value,
    cached_at: i64,
}

#[derive(Clone)]
pub struct TagCache {
    entries: Arc<RwLock<HashMap<CacheTag, Entry>>>,
    ttl_seconds: i64,
}

impl TagCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), ttl_seconds }
    }

    pub async fn get(&self, tag: CacheTag) -> Option<Value> {
        let entries = self.entries.read().await;
        entries.get(&tag).filter(|e| self.is_fresh(e.cached_at)).map(|e| e.value.clone())
    }

    pub async fn put(&self, tag: CacheTag, value: Value) {
        self.entries.write().await.insert(tag, Entry { value, cached_at: now_sec() });
    }

    /// Cached value for `tag`, or the loader's result, which is then stored.
    pub async fn get_or_load<F, Fut>(&self, tag: CacheTag, load: F) -> AppResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Value>>,
    {
        if let Some(hit) = self.get(tag).await {
            debug!(tag = tag.as_str(), "cache hit");
            return Ok(hit);
        }
        let value = load().await?;
        self.put(tag, value.clone()).await;
        Ok(value)
    }

    pub async fn invalidate(&self, tags: &[CacheTag]) {
        let mut entries = self.entries.write().await;
        for tag in tags {
            entries.remove(tag);
        }
        debug!(tags = ?tags.iter().map(|t| t.as_str()).collect::<Vec<_>>(), "cache invalidated");
    }

    fn is_fresh(&self, cached_at: i64) -> bool {
        now_sec().saturating_sub(cached_at) <= self.ttl_seconds
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn loads_once_until_invalidated() {
        let cache = TagCache::new(3600);
        let calls = AtomicUsize::new(0);
        let load = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "n": 1 }))
        };

        cache.get_or_load(CacheTag::Home, load).await.unwrap();
        cache.get_or_load(CacheTag::Home, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate(&[CacheTag::FeaturedGames]).await;
        cache.get_or_load(CacheTag::Home, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate(&[CacheTag::Home]).await;
        cache.get_or_load(CacheTag::Home, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = TagCache::new(-1);
        cache.put(CacheTag::Media, json!([1])).await;
        assert!(cache.get(CacheTag::Media).await.is_none());
    }

    #[test]
    fn tags_parse_by_name() {
        assert_eq!("featured-board-games".parse::<CacheTag>(), Ok(CacheTag::FeaturedBoardGames));
        assert!("everything".parse::<CacheTag>().is_err());
    }
}
