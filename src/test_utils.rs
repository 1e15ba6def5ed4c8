#[cfg(test)]
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::models::domain::{GenerationContext, Level};

    pub const SAMPLE_TOPIC: &str = "Photosynthesis";

    pub fn sample_context() -> GenerationContext {
        GenerationContext::new()
            .with_subject("Biology")
            .with_level(Level::Intermediate)
            .with_description("How plants turn light into chemical energy.")
    }

    fn key_point(n: usize, importance: &str) -> Value {
        json!({
            "id": format!("kp{n}"),
            "title": format!("Stage {n} of photosynthesis"),
            "description": format!("What happens during stage {n}."),
            "importance": importance,
            "examWeight": 6,
            "memorization": "Concept"
        })
    }

    /// A model payload that already satisfies every content rule.
    pub fn sample_payload() -> Value {
        json!({
            "summary": "Photosynthesis converts light energy into glucose inside chloroplasts.",
            "keyPoints": [
                key_point(1, "Critical"),
                key_point(2, "Critical"),
                key_point(3, "Important"),
                key_point(4, "Important"),
                key_point(5, "Useful")
            ],
            "concepts": (1..=3).map(|n| json!({
                "id": format!("concept{n}"),
                "concept": format!("Concept {n}"),
                "simpleExplanation": "Plain explanation.",
                "detailedExplanation": "Longer explanation.",
                "realWorldExample": "A leaf in sunlight.",
                "commonMistakes": ["Confusing it with respiration"],
                "relatedConcepts": ["Chlorophyll"]
            })).collect::<Vec<_>>(),
            "examQuestions": [{
                "id": "eq1",
                "question": "Where does the Calvin cycle take place?",
                "type": "MCQ",
                "difficulty": "Easy",
                "options": ["Stroma", "Thylakoid", "Cytoplasm", "Nucleus"],
                "answer": "Stroma",
                "explanation": "Carbon fixation happens in the stroma.",
                "examTips": "Remember light-independent means stroma.",
                "timeToSolve": "1 minute"
            }],
            "practiceProblems": [{
                "id": "pp1",
                "problem": "Balance the overall equation.",
                "solution": "6CO2 + 6H2O -> C6H12O6 + 6O2",
                "steps": ["Count carbons", "Balance oxygen"],
                "skillTested": "Equation balancing",
                "variants": ["Balance cellular respiration"]
            }],
            "mnemonics": (1..=4).map(|n| json!({
                "id": format!("mn{n}"),
                "concept": format!("Concept {n}"),
                "mnemonic": "LEO the lion",
                "explanation": "Light Energy Oxidises water.",
                "type": "Phrase"
            })).collect::<Vec<_>>(),
            "quickReview": {
                "mustKnow": ["Light reactions make ATP and NADPH"],
                "formulasToMemorize": ["6CO2 + 6H2O -> C6H12O6 + 6O2"],
                "keyTerms": [{ "term": "Stroma", "definition": "Fluid inside the chloroplast" }],
                "commonFormulas": [{
                    "name": "Overall equation",
                    "formula": "6CO2 + 6H2O -> C6H12O6 + 6O2",
                    "whenToUse": "Any stoichiometry question"
                }],
                "lastMinuteTips": ["Label the chloroplast diagram"]
            },
            "studyTips": ["Draw the cycle from memory"],
            "timeToMaster": "3-4 hours"
        })
    }

    /// The sample payload the way chat models tend to return it.
    pub fn fenced_response(payload: &Value) -> String {
        format!("Here are your notes:\n```json\n{payload}\n```\nGood luck!")
    }
}

#[cfg(test)]
pub mod fakes {
    use async_trait::async_trait;

    use crate::{errors::ModelError, services::model_service::ModelClient};

    /// Model client that answers every prompt with the same result.
    pub struct StaticModel(pub Result<String, ModelError>);

    #[async_trait]
    impl ModelClient for StaticModel {
        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            self.0.clone()
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    use crate::models::domain::StructuredContent;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }

    /// Asserts the content rules callers rely on, with the configured default minimums.
    pub fn assert_valid_content(content: &StructuredContent) {
        let violations = content.violations();
        assert!(violations.is_empty(), "content violations: {:?}", violations);
        assert!(content.key_points.len() >= 5);
        assert!(content.concepts.len() >= 3);
        assert!(content.mnemonics.len() >= 4);
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::StructuredContent;

    #[test]
    fn sample_payload_deserializes_without_repair() {
        let content: StructuredContent =
            serde_json::from_value(sample_payload()).expect("sample payload is valid");
        assert!(content.violations().is_empty());
        assert_eq!(content.key_points.len(), 5);
    }

    #[test]
    fn fenced_response_contains_payload() {
        let text = fenced_response(&sample_payload());
        assert!(text.starts_with("Here are your notes"));
        assert!(text.contains("\"keyPoints\""));
    }
}
