use std::{sync::Arc, time::Duration};

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::Config,
    constants::prompts::STUDY_NOTES_SYSTEM_PROMPT,
    errors::{ModelError, ModelErrorKind},
};

/// One text-in/text-out call to the generative model. Implementations do not retry.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

const QUOTA_MARKERS: &[&str] = &[
    "429",
    "resource_exhausted",
    "resource exhausted",
    "quota",
    "rate limit",
    "rate_limit",
    "too many requests",
];

/// Classifies a provider failure by its message text.
pub fn classify_error_message(message: &str) -> ModelErrorKind {
    let lowered = message.to_lowercase();
    if QUOTA_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        ModelErrorKind::QuotaExceeded
    } else {
        ModelErrorKind::Transport
    }
}

pub fn model_error_from_message(message: impl Into<String>) -> ModelError {
    let message = message.into();
    ModelError {
        kind: classify_error_message(&message),
        message,
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct OpenAiModelClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiModelClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(config.model_api_base.clone())
            .with_api_key(config.model_api_key.expose_secret().to_string());

        Self {
            client: Client::with_config(openai_config),
            model: config.model_name.clone(),
            temperature: config.model_temperature,
            timeout: config.model_timeout(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiModelClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = json!({
            "model": self.model,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": STUDY_NOTES_SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        let chat = self.client.chat();
        let call = chat.create_byot(request);
        let completion: ChatCompletion = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                ModelError::transport(format!(
                    "model call timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| model_error_from_message(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ModelError::transport("model returned an empty completion"))
    }
}

/// Retries transport failures with exponential backoff. Quota failures are returned at once.
pub struct RetryingModelClient {
    inner: Arc<dyn ModelClient>,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingModelClient {
    pub fn new(inner: Arc<dyn ModelClient>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }
}

#[async_trait]
impl ModelClient for RetryingModelClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let mut attempt = 0;
        let mut delay = self.backoff;
        loop {
            match self.inner.generate(prompt).await {
                Err(err) if err.kind == ModelErrorKind::Transport && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "Model call failed ({}), retry {}/{} in {:?}",
                        err.message,
                        attempt,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedModel {
        responses: Mutex<Vec<Result<String, ModelError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedModel {
        fn new(mut responses: Vec<Result<String, ModelError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(ModelError::transport("script exhausted")))
        }
    }

    #[test]
    fn classifies_quota_markers() {
        assert_eq!(
            classify_error_message("status 429: Too Many Requests"),
            ModelErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_error_message("[GoogleGenerativeAI Error]: RESOURCE_EXHAUSTED"),
            ModelErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_error_message("You exceeded your current quota"),
            ModelErrorKind::QuotaExceeded
        );
    }

    #[test]
    fn classifies_everything_else_as_transport() {
        assert_eq!(
            classify_error_message("error sending request: connection reset"),
            ModelErrorKind::Transport
        );
        assert_eq!(classify_error_message(""), ModelErrorKind::Transport);
    }

    #[tokio::test]
    async fn retrying_client_retries_transport_errors() {
        let inner = Arc::new(ScriptedModel::new(vec![
            Err(ModelError::transport("reset")),
            Ok("{}".to_string()),
        ]));
        let client = RetryingModelClient::new(inner.clone(), 2, Duration::from_millis(1));

        assert_eq!(client.generate("p").await.unwrap(), "{}");
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn retrying_client_never_retries_quota_errors() {
        let inner = Arc::new(ScriptedModel::new(vec![
            Err(ModelError::quota_exceeded("RESOURCE_EXHAUSTED")),
            Ok("{}".to_string()),
        ]));
        let client = RetryingModelClient::new(inner.clone(), 3, Duration::from_millis(1));

        let err = client.generate("p").await.unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::QuotaExceeded);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn retrying_client_gives_up_after_max_retries() {
        let inner = Arc::new(ScriptedModel::new(vec![]));
        let client = RetryingModelClient::new(inner.clone(), 2, Duration::from_millis(1));

        let err = client.generate("p").await.unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::Transport);
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn openai_client_maps_unreachable_endpoint_to_transport() {
        let config = Config::test_config();
        let client = OpenAiModelClient::new(&config);

        let err = client.generate("hello").await.unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::Transport);
    }
}
