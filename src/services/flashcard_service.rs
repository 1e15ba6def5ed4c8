use crate::models::domain::{Flashcard, FlashcardKind, StructuredContent};

/// Turns study content into question/answer cards. Pure; entries with a blank side are skipped.
pub fn derive_flashcards(content: &StructuredContent) -> Vec<Flashcard> {
    let key_points = content
        .key_points
        .iter()
        .map(|p| (p.title.clone(), p.description.clone(), FlashcardKind::KeyPoint));

    let concepts = content
        .concepts
        .iter()
        .map(|c| (c.concept.clone(), c.simple_explanation.clone(), FlashcardKind::Concept));

    let key_terms = content
        .quick_review
        .key_terms
        .iter()
        .map(|t| (t.term.clone(), t.definition.clone(), FlashcardKind::KeyTerm));

    let formulas = content.quick_review.common_formulas.iter().map(|f| {
        let back = if f.when_to_use.trim().is_empty() {
            f.formula.clone()
        } else {
            format!("{}\nUse when: {}", f.formula, f.when_to_use)
        };
        (f.name.clone(), back, FlashcardKind::Formula)
    });

    let mnemonics = content.mnemonics.iter().map(|m| {
        let back = if m.explanation.trim().is_empty() {
            m.mnemonic.clone()
        } else {
            format!("{}\n{}", m.mnemonic, m.explanation)
        };
        (format!("Memory aid: {}", m.concept), back, FlashcardKind::Mnemonic)
    });

    key_points
        .chain(concepts)
        .chain(key_terms)
        .chain(formulas)
        .chain(mnemonics)
        .filter(|(front, back, _)| !front.trim().is_empty() && !back.trim().is_empty())
        .enumerate()
        .map(|(i, (front, back, kind))| Flashcard {
            id: format!("fc{}", i + 1),
            front,
            back,
            kind,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ContentMinimums,
        services::fallback_content::{FallbackSynthesizer, TopicSeed},
    };

    fn sample_content() -> StructuredContent {
        let seed = TopicSeed::new("Ohm's Law", None, Some("Physics"));
        FallbackSynthesizer::new(ContentMinimums::default()).synthesize(&seed, None)
    }

    #[test]
    fn derives_cards_from_every_section() {
        let content = sample_content();
        let cards = derive_flashcards(&content);

        let expected = content.key_points.len()
            + content.concepts.len()
            + content.quick_review.key_terms.len()
            + content.quick_review.common_formulas.len()
            + content.mnemonics.len();
        assert_eq!(cards.len(), expected);
        assert_eq!(cards[0].kind, FlashcardKind::KeyPoint);
        assert_eq!(cards[0].front, content.key_points[0].title);
        assert_eq!(cards.last().map(|c| c.kind), Some(FlashcardKind::Mnemonic));
    }

    #[test]
    fn ids_are_sequential() {
        let cards = derive_flashcards(&sample_content());
        for (i, card) in cards.iter().enumerate() {
            assert_eq!(card.id, format!("fc{}", i + 1));
        }
    }

    #[test]
    fn blank_sides_are_skipped() {
        let mut content = sample_content();
        content.key_points[0].description = "  ".to_string();
        content.quick_review.key_terms.clear();

        let cards = derive_flashcards(&content);
        assert!(cards.iter().all(|c| c.front != content.key_points[0].title));
        assert!(cards.iter().all(|c| c.kind != FlashcardKind::KeyTerm));
    }

    #[test]
    fn derivation_is_pure() {
        let content = sample_content();
        assert_eq!(derive_flashcards(&content), derive_flashcards(&content));
    }
}
