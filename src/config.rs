use std::{env, str::FromStr, time::Duration};
use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;
pub const DEFAULT_MODEL_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Mongo,
}

/// Floors for the three arrays downstream renderers cannot show empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentMinimums {
    pub key_points: usize,
    pub concepts: usize,
    pub mnemonics: usize,
}

impl ContentMinimums {
    /// Raises each floor to at least one; these arrays are never empty.
    pub fn at_least_one(self) -> Self {
        Self {
            key_points: self.key_points.max(1),
            concepts: self.concepts.max(1),
            mnemonics: self.mnemonics.max(1),
        }
    }
}

impl Default for ContentMinimums {
    fn default() -> Self {
        Self {
            key_points: 5,
            concepts: 3,
            mnemonics: 4,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub storage_backend: StorageBackend,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub cache_collection: String,
    pub model_api_base: String,
    pub model_api_key: SecretString,
    pub model_name: String,
    pub model_temperature: f32,
    pub model_timeout_secs: u64,
    pub model_max_retries: u32,
    pub model_retry_backoff_ms: u64,
    pub cache_ttl_hours: i64,
    pub minimums: ContentMinimums,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = ContentMinimums::default();
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env_or("WEB_SERVER_PORT", 8080),
            storage_backend: match env::var("STORAGE_BACKEND").as_deref() {
                Ok("mongo") | Ok("mongodb") => StorageBackend::Mongo,
                _ => StorageBackend::Memory,
            },
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "study-notes-local".to_string()),
            cache_collection: env::var("CACHE_COLLECTION")
                .unwrap_or_else(|_| "study_content_cache".to_string()),
            model_api_base: env::var("MODEL_API_BASE")
                .unwrap_or_else(|_| DEFAULT_MODEL_API_BASE.to_string()),
            model_api_key: SecretString::from(env::var("MODEL_API_KEY").unwrap_or_default()),
            model_name: env::var("MODEL_NAME").unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            model_temperature: env_or("MODEL_TEMPERATURE", 0.7),
            model_timeout_secs: env_or("MODEL_TIMEOUT_SECS", 60),
            model_max_retries: env_or("MODEL_MAX_RETRIES", 0),
            model_retry_backoff_ms: env_or("MODEL_RETRY_BACKOFF_MS", 500),
            cache_ttl_hours: env_or("CACHE_TTL_HOURS", DEFAULT_CACHE_TTL_HOURS),
            minimums: ContentMinimums {
                key_points: env_or("MIN_KEY_POINTS", defaults.key_points),
                concepts: env_or("MIN_CONCEPTS", defaults.concepts),
                mnemonics: env_or("MIN_MNEMONICS", defaults.mnemonics),
            }
            .at_least_one(),
        }
    }

    /// Falls back to the default TTL when `cache_ttl_hours` does not fit a `chrono::Duration`.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.cache_ttl_hours.max(0)).unwrap_or_else(|| {
            log::warn!(
                "CACHE_TTL_HOURS={} is out of range, using {}",
                self.cache_ttl_hours,
                DEFAULT_CACHE_TTL_HOURS
            );
            chrono::Duration::hours(DEFAULT_CACHE_TTL_HOURS)
        })
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.model_retry_backoff_ms)
    }

    /// Rejects configuration that would make every request fall back to templates.
    pub fn validate_for_production(&self) -> AppResult<()> {
        use secrecy::ExposeSecret;

        if self.model_api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ValidationError(
                "MODEL_API_KEY is not set; every request would be served by the fallback generator"
                    .to_string(),
            ));
        }

        if self.cache_ttl_hours <= 0 {
            return Err(AppError::ValidationError(format!(
                "CACHE_TTL_HOURS must be positive, got {}",
                self.cache_ttl_hours
            )));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            storage_backend: StorageBackend::Memory,
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "study-notes-test".to_string(),
            cache_collection: "study_content_cache".to_string(),
            model_api_base: "http://127.0.0.1:9/v1".to_string(),
            model_api_key: SecretString::from("test_model_key".to_string()),
            model_name: "test-model".to_string(),
            model_temperature: 0.0,
            model_timeout_secs: 1,
            model_max_retries: 0,
            model_retry_backoff_ms: 1,
            cache_ttl_hours: 24,
            minimums: ContentMinimums::default(),
        }
    }
}
