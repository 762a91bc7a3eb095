//! OpenAI-compatible chat completion client.

use async_trait::async_trait;
use reqwest::Client;
use timeclock_core::traits::{ChatError, ChatProvider};

use super::protocol::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;

/// Chat provider speaking the `/chat/completions` API.
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChat {
    /// Create a client for the public OpenAI API.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Use a different API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Full URL of the completion endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, system_prompt: &str, user_message: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_message),
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<Option<String>, ChatError> {
        let body = self.request_body(system_prompt, user_message);

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;

        tracing::debug!(model = %self.model, "chat completion received");
        Ok(completion.into_text())
    }
}
