use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::ContentMinimums,
    errors::{AppResult, GenerationFailure},
    models::domain::{
        ContentSource, Flashcard, FlashcardDeck, GenerationContext, GenerationKind,
        GenerationOutcome, StructuredContent,
    },
    repositories::{CacheEntry, CacheKey, CacheLookup, ResultCache},
    services::{
        content_repair::ContentRepairer,
        fallback_content::{FallbackSynthesizer, TopicSeed},
        flashcard_service::derive_flashcards,
        model_service::ModelClient,
        prompt_builder::build_study_prompt,
        response_extractor::extract_json,
        single_flight::SingleFlight,
    },
};

/// Produces study content for a topic and never fails.
///
/// A request moves through cache check, model generation, repair and, when any step of the
/// model path fails, template synthesis. Model and template results are both written to the
/// cache, and concurrent requests for one key share a single generation in memory, so
/// coalescing holds even when the cache cannot be written.
pub struct StudyContentService {
    model: Arc<dyn ModelClient>,
    cache: Arc<ResultCache>,
    synthesizer: FallbackSynthesizer,
    repairer: ContentRepairer,
    in_flight: SingleFlight<GenerationOutcome>,
}

impl StudyContentService {
    pub fn new(
        model: Arc<dyn ModelClient>,
        cache: Arc<ResultCache>,
        minimums: ContentMinimums,
    ) -> Self {
        let synthesizer = FallbackSynthesizer::new(minimums);
        Self {
            model,
            cache,
            repairer: ContentRepairer::new(synthesizer.clone()),
            synthesizer,
            in_flight: SingleFlight::new(),
        }
    }

    pub async fn generate_structured_content(
        &self,
        topic: &str,
        ctx: &GenerationContext,
    ) -> Arc<StructuredContent> {
        self.generate(topic, ctx).await.content
    }

    pub async fn generate(&self, topic: &str, ctx: &GenerationContext) -> GenerationOutcome {
        let key = CacheKey::for_request(topic, ctx, GenerationKind::Notes);

        log::debug!("[{}] CacheCheck", key);
        if let Some(entry) = self.lookup::<StructuredContent>(&key).await {
            return cached_outcome(entry);
        }

        let key_ref = &key;
        let (outcome, led) = self
            .in_flight
            .run(key.as_str(), move || async move {
                self.generate_uncached(key_ref, topic, ctx).await
            })
            .await;

        if led {
            outcome
        } else {
            log::debug!("[{}] Served by a concurrent generation", key);
            GenerationOutcome {
                cached: true,
                ..outcome
            }
        }
    }

    /// Runs once per flight. Re-checks the cache in case an earlier flight for the key has
    /// just finished.
    async fn generate_uncached(
        &self,
        key: &CacheKey,
        topic: &str,
        ctx: &GenerationContext,
    ) -> GenerationOutcome {
        if let Some(entry) = self.lookup::<StructuredContent>(key).await {
            return cached_outcome(entry);
        }

        let seed = TopicSeed::new(topic, ctx.description(), ctx.subject());
        let (content, source) = match self.generate_from_model(key, topic, ctx, &seed).await {
            Ok(content) => (content, ContentSource::Model),
            Err(failure) => {
                let reason = failure.kind();
                log::warn!("[{}] Falling back to template content ({:?}): {}", key, reason, failure);
                log::debug!("[{}] Synthesizing", key);
                (
                    self.synthesizer.synthesize(&seed, Some(reason)),
                    ContentSource::Fallback(reason),
                )
            }
        };

        let violations = content.violations();
        if !violations.is_empty() {
            log::warn!("[{}] Content has violations: {:?}", key, violations);
        }

        self.store(key, &content, source).await;
        GenerationOutcome {
            content: Arc::new(content),
            source,
            cached: false,
        }
    }

    async fn generate_from_model(
        &self,
        key: &CacheKey,
        topic: &str,
        ctx: &GenerationContext,
        seed: &TopicSeed,
    ) -> Result<StructuredContent, GenerationFailure> {
        log::debug!("[{}] Generating", key);
        let prompt = build_study_prompt(topic, ctx);
        let raw = self.model.generate(&prompt).await?;

        log::debug!("[{}] Repairing {} chars of model output", key, raw.len());
        let json = extract_json(&raw)?;
        let value: Value = serde_json::from_str(&json)?;
        Ok(self.repairer.repair(&value, seed))
    }

    /// Flashcards for a topic, derived from its notes and cached separately.
    pub async fn generate_flashcards(&self, topic: &str, ctx: &GenerationContext) -> FlashcardDeck {
        let key = CacheKey::for_request(topic, ctx, GenerationKind::Flashcards);
        if let Some(entry) = self.lookup::<Vec<Flashcard>>(&key).await {
            return FlashcardDeck {
                flashcards: entry.payload,
                source: entry.source,
                cached: true,
            };
        }

        let notes = self.generate(topic, ctx).await;
        let flashcards = derive_flashcards(&notes.content);
        self.store(&key, &flashcards, notes.source).await;

        FlashcardDeck {
            flashcards,
            source: notes.source,
            cached: false,
        }
    }

    /// Drops the cached notes and flashcards for a topic so the next request regenerates them.
    pub async fn invalidate(&self, topic: &str, ctx: &GenerationContext) -> AppResult<()> {
        for kind in [GenerationKind::Notes, GenerationKind::Flashcards] {
            let key = CacheKey::for_request(topic, ctx, kind);
            self.cache.invalidate(&key).await?;
            log::info!("Invalidated cache entry {}", key);
        }
        Ok(())
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<CacheEntry<T>> {
        match self.cache.get::<T>(key).await {
            Ok(CacheLookup::Hit(entry)) => {
                log::debug!("[{}] Cache hit", key);
                Some(entry)
            }
            Ok(CacheLookup::Miss) => {
                log::debug!("[{}] Cache miss", key);
                None
            }
            Err(e) => {
                log::warn!("[{}] Cache read failed, treating as miss: {}", key, e);
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &CacheKey, payload: &T, source: ContentSource) {
        if let Err(e) = self.cache.put(key, payload, source).await {
            log::warn!("[{}] Cache write failed: {}", key, e);
        }
    }
}

fn cached_outcome(entry: CacheEntry<StructuredContent>) -> GenerationOutcome {
    GenerationOutcome {
        content: Arc::new(entry.payload),
        source: entry.source,
        cached: true,
    }
}
