use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use study_notes_server::{
    errors::{AppError, AppResult, FailureKind},
    models::domain::{ContentSource, GenerationContext, GenerationKind},
    repositories::{CacheEntry, CacheKey, CacheLookup, InMemoryStorage, ResultCache, Storage},
};

/// Storage that counts removals, so lazy eviction can be observed.
#[derive(Default)]
struct RecordingStorage {
    values: RwLock<HashMap<String, String>>,
    removals: AtomicUsize,
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.values.write().await.remove(key);
        Ok(())
    }
}

struct UnavailableStorage;

#[async_trait]
impl Storage for UnavailableStorage {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::StorageError("unavailable".to_string()))
    }

    async fn set(&self, _key: &str, _value: String) -> AppResult<()> {
        Err(AppError::StorageError("unavailable".to_string()))
    }

    async fn remove(&self, _key: &str) -> AppResult<()> {
        Err(AppError::StorageError("unavailable".to_string()))
    }
}

async fn assert_storage_contract(storage: &dyn Storage) {
    assert_eq!(storage.get("missing").await.unwrap(), None);

    storage.set("a", "1".to_string()).await.unwrap();
    storage.set("b", "2".to_string()).await.unwrap();
    storage.set("a", "3".to_string()).await.unwrap();
    assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("3"));
    assert_eq!(storage.get("b").await.unwrap().as_deref(), Some("2"));

    storage.remove("a").await.unwrap();
    storage.remove("never-set").await.unwrap();
    assert_eq!(storage.get("a").await.unwrap(), None);
    assert_eq!(storage.get("b").await.unwrap().as_deref(), Some("2"));
}

fn notes_key(topic: &str) -> CacheKey {
    CacheKey::for_request(topic, &GenerationContext::new(), GenerationKind::Notes)
}

#[tokio::test]
async fn test_in_memory_storage_contract() {
    assert_storage_contract(&InMemoryStorage::new()).await;
}

#[tokio::test]
async fn test_recording_storage_contract() {
    assert_storage_contract(&RecordingStorage::default()).await;
}

#[tokio::test]
async fn test_expired_entry_is_evicted_on_lookup_only() {
    let storage = Arc::new(RecordingStorage::default());
    let cache = ResultCache::new(storage.clone(), Duration::hours(24));
    let key = notes_key("Acids and Bases");

    cache
        .put_entry(&CacheEntry {
            key: key.to_string(),
            payload: "old notes".to_string(),
            source: ContentSource::Model,
            created_at: Utc::now() - Duration::hours(25),
        })
        .await
        .unwrap();
    assert_eq!(storage.removals.load(Ordering::SeqCst), 0);

    let lookup = cache.get::<String>(&key).await.unwrap();
    assert!(matches!(lookup, CacheLookup::Miss));
    assert_eq!(storage.removals.load(Ordering::SeqCst), 1);
    assert_eq!(storage.get(key.as_str()).await.unwrap(), None);
}

#[tokio::test]
async fn test_fallback_source_survives_the_cache() {
    let cache = ResultCache::new(Arc::new(InMemoryStorage::new()), Duration::hours(24));
    let key = notes_key("Acids and Bases");

    cache
        .put(&key, &"template notes".to_string(), ContentSource::Fallback(FailureKind::ParseFailure))
        .await
        .unwrap();

    match cache.get::<String>(&key).await.unwrap() {
        CacheLookup::Hit(entry) => {
            assert_eq!(entry.source, ContentSource::Fallback(FailureKind::ParseFailure));
            assert_eq!(entry.key, key.to_string());
        }
        CacheLookup::Miss => panic!("fresh entry should hit"),
    }
}

#[tokio::test]
async fn test_shorter_ttl_is_honoured() {
    let cache = ResultCache::new(Arc::new(InMemoryStorage::new()), Duration::minutes(30));
    let key = notes_key("Stoichiometry");

    cache
        .put_entry(&CacheEntry {
            key: key.to_string(),
            payload: 1u8,
            source: ContentSource::Model,
            created_at: Utc::now() - Duration::minutes(31),
        })
        .await
        .unwrap();

    assert!(matches!(cache.get::<u8>(&key).await.unwrap(), CacheLookup::Miss));
}

#[tokio::test]
async fn test_storage_errors_surface_from_cache() {
    let cache = ResultCache::new(Arc::new(UnavailableStorage), Duration::hours(24));
    let key = notes_key("Stoichiometry");

    assert!(cache.get::<u8>(&key).await.is_err());
    assert!(cache.put(&key, &1u8, ContentSource::Model).await.is_err());
}

#[test]
fn test_keys_are_scoped_per_owner() {
    let topic = "Stoichiometry";
    let lesson_a = GenerationContext::new().with_lesson("a");
    let lesson_b = GenerationContext::new().with_lesson("b");

    assert_ne!(
        CacheKey::for_request(topic, &lesson_a, GenerationKind::Notes),
        CacheKey::for_request(topic, &lesson_b, GenerationKind::Notes)
    );
    assert_ne!(
        CacheKey::for_request(topic, &lesson_a, GenerationKind::Notes),
        CacheKey::for_request("Molar mass", &lesson_a, GenerationKind::Notes)
    );
}
