use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{db::Database, errors::AppResult};

/// Durable string key-value store behind the result cache.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: String) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    key: String,
    value: String,
}

pub struct MongoStorage {
    collection: Collection<StoredValue>,
}

impl MongoStorage {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for cache storage collection");

        let key_index = IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("key_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(key_index).await?;

        log::info!("Successfully created indexes for cache storage collection");
        Ok(())
    }
}

#[async_trait]
impl Storage for MongoStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let stored = self.collection.find_one(doc! { "key": key }).await?;
        Ok(stored.map(|s| s.value))
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let stored = StoredValue {
            key: key.to_string(),
            value,
        };
        self.collection
            .replace_one(doc! { "key": key }, &stored)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.collection.delete_one(doc! { "key": key }).await?;
        Ok(())
    }
}

/// Process-local storage; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_storage_round_trips_values() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", "v1".to_string()).await.unwrap();
        storage.set("k", "v2".to_string()).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len().await, 1);

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[test]
    fn storages_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InMemoryStorage>();
        assert_send_sync::<MongoStorage>();
    }
}
