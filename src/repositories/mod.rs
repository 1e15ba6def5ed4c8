pub mod content_cache_repository;
pub mod storage;

pub use content_cache_repository::{CacheEntry, CacheKey, CacheLookup, ResultCache};
pub use storage::{InMemoryStorage, MongoStorage, Storage};
