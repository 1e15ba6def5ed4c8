use std::fmt::Write;

use crate::{
    constants::prompts::STUDY_NOTES_JSON_SHAPE,
    models::domain::{GenerationContext, Level},
};

/// Inclusive bounds requested from the model for each list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemRange {
    pub min: usize,
    pub max: usize,
}

pub const KEY_POINTS: ItemRange = ItemRange { min: 5, max: 6 };
pub const CONCEPTS: ItemRange = ItemRange { min: 3, max: 4 };
pub const EXAM_QUESTIONS: ItemRange = ItemRange { min: 4, max: 6 };
pub const PRACTICE_PROBLEMS: ItemRange = ItemRange { min: 2, max: 3 };
pub const MNEMONICS: ItemRange = ItemRange { min: 4, max: 5 };
pub const KEY_TERMS: ItemRange = ItemRange { min: 5, max: 8 };

/// Lesson text beyond this many characters is cut before it reaches the prompt.
pub const MAX_CONTEXT_CHARS: usize = 4000;

/// Renders the instruction sent to the model for one topic.
pub fn build_study_prompt(topic: &str, ctx: &GenerationContext) -> String {
    let topic = topic.trim();
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Create exam-ready study notes for the topic \"{topic}\".");
    if let Some(subject) = ctx.subject() {
        let _ = writeln!(prompt, "Subject: {subject}");
    }
    let level = ctx.level.unwrap_or(Level::Intermediate);
    let _ = writeln!(
        prompt,
        "Student level: {} ({})",
        level.as_str(),
        level_guidance(level)
    );

    if let Some(description) = ctx.description() {
        let _ = writeln!(
            prompt,
            "\nLesson context (background only):\n\"\"\"\n{}\n\"\"\"",
            truncate_chars(description, MAX_CONTEXT_CHARS)
        );
        let _ = writeln!(
            prompt,
            "Write about \"{topic}\" itself. Do not summarise, quote or describe the lesson context above; use it only to understand which aspects of the topic matter."
        );
    } else {
        let _ = writeln!(prompt, "\nWrite about \"{topic}\" itself.");
    }

    let _ = writeln!(prompt, "\nProvide exactly:");
    let _ = writeln!(prompt, "- {} key points", range_text(KEY_POINTS));
    let _ = writeln!(prompt, "- {} concept explanations", range_text(CONCEPTS));
    let _ = writeln!(
        prompt,
        "- {} exam questions mixing at least three question types",
        range_text(EXAM_QUESTIONS)
    );
    let _ = writeln!(prompt, "- {} practice problems", range_text(PRACTICE_PROBLEMS));
    let _ = writeln!(prompt, "- {} mnemonics", range_text(MNEMONICS));
    let _ = writeln!(prompt, "- {} key terms in quickReview", range_text(KEY_TERMS));

    let _ = writeln!(
        prompt,
        "\nReturn ONLY a JSON object with exactly this shape. Enumerated fields must use one of the listed values verbatim:\n{STUDY_NOTES_JSON_SHAPE}"
    );

    prompt
}

fn level_guidance(level: Level) -> &'static str {
    match level {
        Level::Beginner => "assume no prior knowledge, define every term, favour intuition",
        Level::Intermediate => "assume the fundamentals, focus on typical exam depth",
        Level::Advanced => "assume fluency, emphasise edge cases, derivations and synthesis",
    }
}

fn range_text(range: ItemRange) -> String {
    if range.min == range.max {
        range.min.to_string()
    } else {
        format!("{}-{}", range.min, range.max)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
