use std::sync::Arc;

use crate::{
    config::{Config, StorageBackend},
    db::Database,
    errors::AppResult,
    repositories::{InMemoryStorage, MongoStorage, ResultCache, Storage},
    services::{
        model_service::{ModelClient, OpenAiModelClient, RetryingModelClient},
        StudyContentService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub study_content_service: Arc<StudyContentService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let (storage, db): (Arc<dyn Storage>, Option<Database>) = match config.storage_backend {
            StorageBackend::Mongo => {
                let db = Database::connect(&config).await?;
                let storage = MongoStorage::new(&db, &config.cache_collection);
                storage.ensure_indexes().await?;
                (Arc::new(storage), Some(db))
            }
            StorageBackend::Memory => {
                log::warn!("Using in-memory cache storage; cached content is lost on restart");
                (Arc::new(InMemoryStorage::new()), None)
            }
        };

        let model: Arc<dyn ModelClient> = Arc::new(RetryingModelClient::new(
            Arc::new(OpenAiModelClient::new(&config)),
            config.model_max_retries,
            config.retry_backoff(),
        ));

        Ok(Self::from_parts(model, storage, db, config))
    }

    /// Wires the service from already-built collaborators.
    pub fn from_parts(
        model: Arc<dyn ModelClient>,
        storage: Arc<dyn Storage>,
        db: Option<Database>,
        config: Config,
    ) -> Self {
        let cache = Arc::new(ResultCache::new(storage, config.cache_ttl()));
        log::info!(
            "Study content cached for {} hours (model: {})",
            cache.ttl().num_hours(),
            config.model_name
        );
        let study_content_service =
            Arc::new(StudyContentService::new(model, cache, config.minimums));

        Self {
            study_content_service,
            db,
            config: Arc::new(config),
        }
    }
}
