use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::models::domain::ContentSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
pub enum FlashcardKind {
    KeyPoint,
    Concept,
    KeyTerm,
    Formula,
    Mnemonic,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
    pub kind: FlashcardKind,
}

/// Cards for one topic plus the provenance of the notes they were derived from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashcardDeck {
    pub flashcards: Vec<Flashcard>,
    pub source: ContentSource,
    pub cached: bool,
}
