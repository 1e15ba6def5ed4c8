use async_graphql::{Context, EmptySubscription, Object, Schema as GraphQLSchema};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppResult,
    models::dto::{
        request::StudyContentRequest,
        response::{FlashcardsResponse, InvalidateResponse, StudyContentResponse},
    },
};

pub type Schema = GraphQLSchema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Study notes for a topic; falls back to template content when the model is unavailable.
    async fn study_content(
        &self,
        ctx: &Context<'_>,
        input: StudyContentRequest,
    ) -> AppResult<StudyContentResponse> {
        input.validate()?;
        let state = ctx.data::<AppState>()?;
        let outcome = state
            .study_content_service
            .generate(&input.topic, &input.context())
            .await;
        Ok(outcome.into())
    }

    async fn flashcards(
        &self,
        ctx: &Context<'_>,
        input: StudyContentRequest,
    ) -> AppResult<FlashcardsResponse> {
        input.validate()?;
        let state = ctx.data::<AppState>()?;
        let deck = state
            .study_content_service
            .generate_flashcards(&input.topic, &input.context())
            .await;
        Ok(deck.into())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn invalidate_study_content(
        &self,
        ctx: &Context<'_>,
        input: StudyContentRequest,
    ) -> AppResult<InvalidateResponse> {
        input.validate()?;
        let state = ctx.data::<AppState>()?;
        state
            .study_content_service
            .invalidate(&input.topic, &input.context())
            .await?;
        Ok(InvalidateResponse {
            message: format!("Cached study content for '{}' was cleared", input.topic),
        })
    }
}

pub fn create_schema(app_state: AppState) -> Schema {
    GraphQLSchema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(app_state)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::Config,
        errors::ModelError,
        repositories::InMemoryStorage,
        test_utils::{fakes::StaticModel, fixtures::sample_payload},
    };

    fn schema_with(model: StaticModel) -> Schema {
        create_schema(AppState::from_parts(
            Arc::new(model),
            Arc::new(InMemoryStorage::new()),
            None,
            Config::test_config(),
        ))
    }

    #[tokio::test]
    async fn test_study_content_query() {
        let schema = schema_with(StaticModel(Ok(sample_payload().to_string())));
        let response = schema
            .execute(
                r#"{ studyContent(input: { topic: "Photosynthesis", level: INTERMEDIATE }) {
                    source cached content { summary keyPoints { id importance } }
                } }"#,
            )
            .await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["studyContent"]["source"], "MODEL");
        assert_eq!(data["studyContent"]["content"]["keyPoints"][0]["id"], "kp1");
        assert_eq!(data["studyContent"]["content"]["keyPoints"][0]["importance"], "CRITICAL");
    }

    #[tokio::test]
    async fn test_flashcards_query_on_fallback() {
        let schema = schema_with(StaticModel(Err(ModelError::transport("timeout"))));
        let response = schema
            .execute(r#"{ flashcards(input: { topic: "Vectors" }) { source fallbackReason flashcards { id front } } }"#)
            .await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["flashcards"]["source"], "FALLBACK");
        assert_eq!(data["flashcards"]["fallbackReason"], "TRANSPORT");
        assert_eq!(data["flashcards"]["flashcards"][0]["id"], "fc1");
    }

    #[tokio::test]
    async fn test_invalid_input_is_a_graphql_error() {
        let schema = schema_with(StaticModel(Ok(String::new())));
        let response = schema
            .execute(r#"mutation { invalidateStudyContent(input: { topic: "" }) { message } }"#)
            .await;

        assert_eq!(response.errors.len(), 1);
    }
}
