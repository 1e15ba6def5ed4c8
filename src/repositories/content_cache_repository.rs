use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    errors::AppResult,
    models::domain::{ContentSource, GenerationContext, GenerationKind},
    repositories::storage::Storage,
};

const KEY_PREFIX: &str = "study";

/// Storage key for one generated artefact.
///
/// `study:{scope}:{owner}:{digest}:{kind}` for lesson and course scope, `study:topic:{digest}:{kind}`
/// otherwise. The digest covers the normalized request so a renamed lesson does not serve
/// notes written for its old title.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_request(topic: &str, ctx: &GenerationContext, kind: GenerationKind) -> Self {
        let lesson = non_blank(ctx.lesson_id.as_deref()).map(escape_segment);
        let course = non_blank(ctx.course_id.as_deref()).map(escape_segment);
        let digest = request_digest(topic, ctx);

        let key = match (lesson, course) {
            (Some(lesson), _) => format!("{KEY_PREFIX}:lesson:{lesson}:{digest}:{kind}"),
            (None, Some(course)) => format!("{KEY_PREFIX}:course:{course}:{digest}:{kind}"),
            (None, None) => format!("{KEY_PREFIX}:topic:{digest}:{kind}"),
        };

        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Percent-encodes '%' and ':' so an owner id always stays a single key segment.
fn escape_segment(value: &str) -> String {
    value.replace('%', "%25").replace(':', "%3A")
}

fn normalize(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn request_digest(topic: &str, ctx: &GenerationContext) -> String {
    let mut hasher = Sha256::new();
    for part in [
        normalize(Some(topic)),
        normalize(ctx.description.as_deref()),
        normalize(ctx.subject.as_deref()),
        normalize(ctx.level.map(|l| l.as_str())),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    let hex = format!("{:x}", hasher.finalize());
    hex[..16].to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub key: String,
    pub payload: T,
    pub source: ContentSource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum CacheLookup<T> {
    Hit(CacheEntry<T>),
    Miss,
}

/// TTL cache over [`Storage`]. Expired or unreadable entries count as a miss and are
/// removed on lookup; nothing sweeps in the background.
pub struct ResultCache {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<CacheLookup<T>> {
        let Some(raw) = self.storage.get(key.as_str()).await? else {
            return Ok(CacheLookup::Miss);
        };

        let entry = match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Discarding unreadable cache entry {}: {}", key, e);
                self.storage.remove(key.as_str()).await?;
                return Ok(CacheLookup::Miss);
            }
        };

        if Utc::now() - entry.created_at >= self.ttl {
            log::debug!("Cache entry {} expired (created {})", key, entry.created_at);
            self.storage.remove(key.as_str()).await?;
            return Ok(CacheLookup::Miss);
        }

        Ok(CacheLookup::Hit(entry))
    }

    pub async fn put<T: Serialize>(
        &self,
        key: &CacheKey,
        payload: &T,
        source: ContentSource,
    ) -> AppResult<()> {
        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            source,
            created_at: Utc::now(),
        };
        self.put_entry(&entry).await
    }

    /// Stores a fully formed entry, keeping its `created_at`.
    pub async fn put_entry<T: Serialize>(&self, entry: &CacheEntry<T>) -> AppResult<()> {
        let raw = serde_json::to_string(entry)?;
        self.storage.set(&entry.key, raw).await
    }

    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.storage.remove(key.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::FailureKind, models::domain::Level, repositories::storage::InMemoryStorage,
    };

    fn cache() -> (Arc<InMemoryStorage>, ResultCache) {
        let storage = Arc::new(InMemoryStorage::new());
        let cache = ResultCache::new(storage.clone(), Duration::hours(24));
        (storage, cache)
    }

    fn key() -> CacheKey {
        CacheKey::for_request("Topic", &GenerationContext::new(), GenerationKind::Notes)
    }

    #[test]
    fn key_is_stable_and_normalized() {
        let ctx = GenerationContext::new().with_subject("Physics");
        let a = CacheKey::for_request("  Newton's   Laws ", &ctx, GenerationKind::Notes);
        let b = CacheKey::for_request("newton's laws", &ctx, GenerationKind::Notes);
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("study:topic:"));
        assert!(a.as_str().ends_with(":notes"));
    }

    #[test]
    fn key_separates_kind_level_and_owner() {
        let ctx = GenerationContext::new();
        let notes = CacheKey::for_request("t", &ctx, GenerationKind::Notes);
        let cards = CacheKey::for_request("t", &ctx, GenerationKind::Flashcards);
        let advanced = CacheKey::for_request(
            "t",
            &ctx.clone().with_level(Level::Advanced),
            GenerationKind::Notes,
        );
        let lesson = CacheKey::for_request(
            "t",
            &ctx.clone().with_course("c1").with_lesson("l1"),
            GenerationKind::Notes,
        );

        assert_ne!(notes, cards);
        assert_ne!(notes, advanced);
        let course = CacheKey::for_request("t", &ctx.clone().with_course("c1"), GenerationKind::Notes);

        assert!(lesson.as_str().starts_with("study:lesson:l1:"));
        assert!(course.as_str().starts_with("study:course:c1:"));
    }

    #[test]
    fn owner_ids_cannot_add_key_segments() {
        let ctx = GenerationContext::new();
        let colon = CacheKey::for_request("t", &ctx.clone().with_lesson("a:b"), GenerationKind::Notes);
        let encoded =
            CacheKey::for_request("t", &ctx.clone().with_lesson("a%3Ab"), GenerationKind::Notes);

        assert_eq!(colon.as_str().split(':').count(), 5);
        assert!(colon.as_str().starts_with("study:lesson:a%3Ab:"));
        assert_ne!(colon, encoded);
    }

    #[tokio::test]
    async fn put_then_get_hits() {
        let (_, cache) = cache();
        cache
            .put(&key(), &vec!["a".to_string()], ContentSource::Model)
            .await
            .unwrap();

        match cache.get::<Vec<String>>(&key()).await.unwrap() {
            CacheLookup::Hit(entry) => {
                assert_eq!(entry.payload, vec!["a".to_string()]);
                assert_eq!(entry.source, ContentSource::Model);
            }
            CacheLookup::Miss => panic!("expected a hit"),
        }
    }

    #[tokio::test]
    async fn entry_older_than_ttl_is_a_miss_and_evicted() {
        let (storage, cache) = cache();
        let entry = CacheEntry {
            key: key().to_string(),
            payload: "stale".to_string(),
            source: ContentSource::Fallback(FailureKind::Transport),
            created_at: Utc::now() - Duration::hours(25),
        };
        cache.put_entry(&entry).await.unwrap();

        assert!(matches!(
            cache.get::<String>(&key()).await.unwrap(),
            CacheLookup::Miss
        ));
        assert_eq!(storage.len().await, 0);
    }

    #[tokio::test]
    async fn entry_within_ttl_is_a_hit() {
        let (_, cache) = cache();
        let entry = CacheEntry {
            key: key().to_string(),
            payload: "fresh".to_string(),
            source: ContentSource::Model,
            created_at: Utc::now() - Duration::hours(23),
        };
        cache.put_entry(&entry).await.unwrap();

        assert!(matches!(
            cache.get::<String>(&key()).await.unwrap(),
            CacheLookup::Hit(_)
        ));
    }

    #[tokio::test]
    async fn unreadable_entry_is_a_miss() {
        let (storage, cache) = cache();
        storage.set(key().as_str(), "not json".to_string()).await.unwrap();

        assert!(matches!(
            cache.get::<String>(&key()).await.unwrap(),
            CacheLookup::Miss
        ));
        assert_eq!(storage.len().await, 0);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let (_, cache) = cache();
        cache.put(&key(), &1u32, ContentSource::Model).await.unwrap();
        cache.invalidate(&key()).await.unwrap();

        assert!(matches!(cache.get::<u32>(&key()).await.unwrap(), CacheLookup::Miss));
    }
}
