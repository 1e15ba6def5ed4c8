use async_graphql::InputObject;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::{GenerationContext, Level};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Topic must not be blank".into()));
    }
    Ok(())
}

/// Ids become one segment of the cache key, which is ':'-delimited.
fn no_key_separator(value: &str) -> Result<(), ValidationError> {
    if value.contains(':') {
        return Err(ValidationError::new("separator").with_message("Ids must not contain ':'".into()));
    }
    Ok(())
}

/// Topic plus optional context, shared by every study-content endpoint.
#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct StudyContentRequest {
    #[validate(length(min = 1, max = 300), custom(function = "not_blank"))]
    pub topic: String,

    #[validate(length(max = 20000))]
    pub description: Option<String>,

    #[validate(length(max = 100))]
    pub subject: Option<String>,

    pub level: Option<Level>,

    #[validate(length(min = 1, max = 100), custom(function = "no_key_separator"))]
    pub course_id: Option<String>,

    #[validate(length(min = 1, max = 100), custom(function = "no_key_separator"))]
    pub lesson_id: Option<String>,
}

impl StudyContentRequest {
    pub fn context(&self) -> GenerationContext {
        GenerationContext {
            description: self.description.clone(),
            subject: self.subject.clone(),
            level: self.level,
            course_id: self.course_id.clone(),
            lesson_id: self.lesson_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(topic: &str) -> StudyContentRequest {
        StudyContentRequest {
            topic: topic.to_string(),
            description: None,
            subject: None,
            level: None,
            course_id: None,
            lesson_id: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request("Photosynthesis").validate().is_ok());
    }

    #[test]
    fn test_blank_and_oversized_topics_are_rejected() {
        assert!(request("").validate().is_err());
        assert!(request("   ").validate().is_err());
        assert!(request(&"x".repeat(301)).validate().is_err());
    }

    #[test]
    fn test_oversized_description_is_rejected() {
        let mut req = request("Photosynthesis");
        req.description = Some("d".repeat(20001));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_ids_with_colons_are_rejected() {
        let mut req = request("Photosynthesis");
        req.lesson_id = Some("a:b".to_string());
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("lesson_id"));

        let mut req = request("Photosynthesis");
        req.course_id = Some("c:1".to_string());
        assert!(req.validate().is_err());

        req.course_id = Some("c-1".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_deserializes_camel_case_and_builds_context() {
        let req: StudyContentRequest = serde_json::from_str(
            r#"{"topic":"Ohm's Law","level":"Advanced","courseId":"phys-1","lessonId":"l-2"}"#,
        )
        .unwrap();
        let ctx = req.context();

        assert_eq!(ctx.level, Some(Level::Advanced));
        assert_eq!(ctx.course_id.as_deref(), Some("phys-1"));
        assert_eq!(ctx.lesson_id.as_deref(), Some("l-2"));
        assert_eq!(ctx.description, None);
    }
}
