use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::{extract, QuizService, RetryPolicy};
use crate::error::{GenerationError, GenerationErrorKind};
use crate::models::{QuizQuestion, SolutionDetail};
use crate::prompts;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Gemini-backed quiz content: practice questions and worked solutions,
/// extracted from the model's free-form output.
pub struct GeminiQuizClient {
    http: GeminiHttpClient,
    retry: RetryPolicy,
}

impl GeminiQuizClient {
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
            .ok_or_else(|| GenerationError::classify("No text in Gemini quiz response"))
    }

    /// Generation runs under the retry policy; extraction happens after it,
    /// so a malformed payload is never retried.
    async fn generate_structured<T: DeserializeOwned>(
        &self,
        prompt: &str,
        context: &str,
    ) -> Result<T, GenerationError> {
        let request = GenerateContentRequest::from_prompt(prompt);
        let text = self.retry.run(|| self.generate_once(&request)).await?;
        tracing::debug!("Extracting {} payload from model output", context);
        extract::parse_embedded(&text, context)
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiQuizClient);

/// Letters the options "A) ..., B) ..." the way the solution prompt expects.
fn lettered_options(options: &[String]) -> String {
    options
        .iter()
        .enumerate()
        .map(|(idx, option)| format!("{}) {}", (b'A' + idx as u8) as char, option))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl QuizService for GeminiQuizClient {
    async fn generate_question(
        &self,
        subject: &str,
        difficulty: &str,
        topic: &str,
    ) -> Result<QuizQuestion, GenerationError> {
        let prompt = prompts::render(
            prompts::QUIZ_QUESTION,
            &[
                ("difficulty", difficulty),
                ("subject", subject),
                ("topic", topic),
            ],
        );

        self.generate_structured(&prompt, "question").await
    }

    async fn generate_solution(
        &self,
        question: &str,
        options: &[String],
        correct: usize,
    ) -> Result<SolutionDetail, GenerationError> {
        let correct_option = options.get(correct).ok_or_else(|| GenerationError {
            kind: GenerationErrorKind::Unknown,
            message: format!(
                "correct answer index {} out of range for {} options",
                correct,
                options.len()
            ),
            retry_after: None,
        })?;
        let correct_label = format!("{}) {}", (b'A' + correct as u8) as char, correct_option);

        let prompt = prompts::render(
            prompts::SOLUTION,
            &[
                ("question", question),
                ("options", &lettered_options(options)),
                ("correct", &correct_label),
            ],
        );

        self.generate_structured(&prompt, "solution").await
    }
}
