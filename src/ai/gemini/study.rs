use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::{RetryPolicy, StudyService};
use crate::error::{GenerationError, GenerationErrorKind};
use crate::models::PerformanceSummary;
use crate::prompts;
use async_trait::async_trait;
use std::time::Duration;

/// Gemini-backed study recommendations from a performance snapshot.
pub struct GeminiStudyClient {
    http: GeminiHttpClient,
    retry: RetryPolicy,
}

impl GeminiStudyClient {
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

    async fn generate_once(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<String, GenerationError> {
        let response: GenerateContentResponse = self.http.generate_content(request).await?;
        response
            .text()
            .ok_or_else(|| GenerationError::classify("No text in Gemini study response"))
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiStudyClient);

#[async_trait]
impl StudyService for GeminiStudyClient {
    async fn generate_recommendations(
        &self,
        summary: &PerformanceSummary,
    ) -> Result<String, GenerationError> {
        // The summary goes into the prompt verbatim as JSON.
        let payload = serde_json::to_string(summary).map_err(|e| GenerationError {
            kind: GenerationErrorKind::Unknown,
            message: format!("could not serialize performance summary: {}", e),
            retry_after: None,
        })?;

        let prompt = prompts::render(prompts::RECOMMENDATIONS, &[("performance", &payload)]);
        let request = GenerateContentRequest::from_prompt(&prompt);

        self.retry.run(|| self.generate_once(&request)).await
    }
}
