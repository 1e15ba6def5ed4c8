pub mod flashcard;
pub mod generation;
pub mod study_content;
pub use flashcard::{Flashcard, FlashcardDeck, FlashcardKind};
pub use generation::{ContentSource, GenerationContext, GenerationKind, GenerationOutcome, Level};
pub use study_content::StructuredContent;
