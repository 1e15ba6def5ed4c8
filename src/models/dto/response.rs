use async_graphql::{Enum, SimpleObject};
use serde::Serialize;

use crate::{
    errors::FailureKind,
    models::domain::{ContentSource, Flashcard, FlashcardDeck, GenerationOutcome, StructuredContent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum ContentOrigin {
    Model,
    Fallback,
}

fn split_source(source: ContentSource) -> (ContentOrigin, Option<FailureKind>) {
    match source {
        ContentSource::Model => (ContentOrigin::Model, None),
        ContentSource::Fallback(reason) => (ContentOrigin::Fallback, Some(reason)),
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct StudyContentResponse {
    pub content: StructuredContent,
    pub source: ContentOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FailureKind>,
    pub cached: bool,
}

impl From<GenerationOutcome> for StudyContentResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        let (source, fallback_reason) = split_source(outcome.source);
        Self {
            content: (*outcome.content).clone(),
            source,
            fallback_reason,
            cached: outcome.cached,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardsResponse {
    pub flashcards: Vec<Flashcard>,
    pub source: ContentOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FailureKind>,
    pub cached: bool,
}

impl From<FlashcardDeck> for FlashcardsResponse {
    fn from(deck: FlashcardDeck) -> Self {
        let (source, fallback_reason) = split_source(deck.source);
        Self {
            flashcards: deck.flashcards,
            source,
            fallback_reason,
            cached: deck.cached,
        }
    }
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct InvalidateResponse {
    pub message: String,
}
