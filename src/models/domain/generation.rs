use std::sync::Arc;

use async_graphql::Enum;
use serde::{Deserialize, Serialize};

use crate::{errors::FailureKind, models::domain::StructuredContent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Enum)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

/// Optional metadata that shapes a generation request and scopes its cache entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub description: Option<String>,
    pub subject: Option<String>,
    pub level: Option<Level>,
    pub course_id: Option<String>,
    pub lesson_id: Option<String>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    pub fn with_lesson(mut self, lesson_id: impl Into<String>) -> Self {
        self.lesson_id = Some(lesson_id.into());
        self
    }

    /// Description with surrounding whitespace removed, `None` when blank.
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    pub fn subject(&self) -> Option<&str> {
        non_blank(self.subject.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Notes,
    Flashcards,
}

impl std::fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationKind::Notes => write!(f, "notes"),
            GenerationKind::Flashcards => write!(f, "flashcards"),
        }
    }
}

/// Where a piece of content came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "source", content = "reason", rename_all = "lowercase")]
pub enum ContentSource {
    Model,
    Fallback(FailureKind),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub content: Arc<StructuredContent>,
    pub source: ContentSource,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_accessors_skip_blank_values() {
        let ctx = GenerationContext::new()
            .with_description("   ")
            .with_subject(" Physics ");

        assert_eq!(ctx.description(), None);
        assert_eq!(ctx.subject(), Some("Physics"));
    }

    #[test]
    fn content_source_serializes_with_reason() {
        let json = serde_json::to_value(ContentSource::Fallback(FailureKind::QuotaExceeded))
            .expect("should serialize");
        assert_eq!(
            json,
            serde_json::json!({ "source": "fallback", "reason": "quota_exceeded" })
        );

        let model = serde_json::to_value(ContentSource::Model).expect("should serialize");
        assert_eq!(model, serde_json::json!({ "source": "model" }));
    }

    #[test]
    fn generation_kind_display() {
        assert_eq!(GenerationKind::Notes.to_string(), "notes");
        assert_eq!(GenerationKind::Flashcards.to_string(), "flashcards");
    }
}
