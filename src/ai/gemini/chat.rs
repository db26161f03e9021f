use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::ai::{ChatService, RetryPolicy};
use crate::error::GenerationError;
use crate::models::{ChatExchange, ConversationHistory};
use async_trait::async_trait;
use std::time::Duration;

/// Gemini-backed chat. Stateless: every exchange resubmits the full
/// caller-owned history so the model keeps context.
pub struct GeminiChatClient {
    http: GeminiHttpClient,
    retry: RetryPolicy,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send_once(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<String, GenerationError> {
        let response: GenerateContentResponse = self.http.generate_content(request).await?;
        response
            .text()
            .ok_or_else(|| GenerationError::classify("No text in Gemini chat response"))
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiChatClient);

#[async_trait]
impl ChatService for GeminiChatClient {
    async fn send_message(
        &self,
        prompt: &str,
        history: &ConversationHistory,
    ) -> Result<ChatExchange, GenerationError> {
        let mut contents: Vec<Content> = history.turns().iter().map(Content::from_turn).collect();
        contents.push(Content::user_text(prompt));

        let request = GenerateContentRequest {
            system_instruction: None,
            contents,
            generation_config: None,
        };

        let reply = self.retry.run(|| self.send_once(&request)).await?;

        Ok(ChatExchange {
            history: history.with_exchange(prompt, &reply),
            reply,
        })
    }
}
