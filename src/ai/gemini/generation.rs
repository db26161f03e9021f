use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::ai::{GenerationService, RetryPolicy};
use crate::error::GenerationError;
use async_trait::async_trait;
use std::time::Duration;

/// Gemini-backed plain text generation: one-shot, streamed, and
/// image-grounded prompts.
pub struct GeminiGenerationClient {
    http: GeminiHttpClient,
    retry: RetryPolicy,
}

impl GeminiGenerationClient {
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
            .ok_or_else(|| GenerationError::classify("No text in Gemini response"))
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiGenerationClient);

#[async_trait]
impl GenerationService for GeminiGenerationClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateContentRequest::from_prompt(prompt);
        self.retry.run(|| self.generate_once(&request)).await
    }

    async fn stream_text(
        &self,
        prompt: &str,
        on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), GenerationError> {
        let request = GenerateContentRequest::from_prompt(prompt);

        // Same schedule as the non-streaming calls. A stream that fails and
        // is retried restarts fragment delivery from the top.
        let mut delays = self.retry.delays();
        loop {
            match self.http.stream_generate_content(&request, on_chunk).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_retryable() => match delays.next() {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => return Err(err),
                },
                Err(err) => return Err(err),
            }
        }
    }

    async fn generate_from_image(
        &self,
        prompt: &str,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<String, GenerationError> {
        use base64::Engine as _;
        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        tracing::debug!(
            "Submitting image-grounded prompt ({} bytes, {})",
            image_bytes.len(),
            mime_type
        );

        let request = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: encoded,
                        },
                    },
                ],
            }],
            generation_config: None,
        };

        self.retry.run(|| self.generate_once(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::error::GenerationErrorKind;
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-1.5-flash";

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(2))
    }

    fn make_client(server: &MockServer) -> GeminiGenerationClient {
        GeminiGenerationClient::new("test-key".to_string(), DEFAULT_MODEL.to_string())
            .with_retry_policy(fast_retry())
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_text_returns_model_output() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(test_support::candidate_body(
                "Velocity is the rate of change of position.",
            )))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let text = client.generate_text("What is velocity?").await.unwrap();
        assert_eq!(text, "Velocity is the rate of change of position.");
    }

    #[tokio::test]
    async fn test_quota_error_is_not_retried() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.generate_text("prompt").await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::QuotaExceeded);
        assert_eq!(err.retry_after, Some(Duration::from_millis(60_000)));
    }

    #[tokio::test]
    async fn test_unavailable_error_exhausts_attempts() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(3)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.generate_text("prompt").await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::ServiceUnavailable);
        assert_eq!(err.retry_after, Some(Duration::from_millis(30_000)));
    }

    #[tokio::test]
    async fn test_recovers_when_second_attempt_succeeds() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200).set_body_json(test_support::candidate_body("recovered")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let text = client.generate_text("prompt").await.unwrap();
        assert_eq!(text, "recovered");
    }

    #[tokio::test]
    async fn test_empty_candidates_are_retried_as_unknown() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.generate_text("prompt").await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_generate_from_image_submits_inline_data() {
        let server = MockServer::start().await;

        // 0x89 0x50 base64-encodes to iVA=.
        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("\"mimeType\":\"image/png\""))
            .and(body_string_contains("iVA="))
            .and(body_string_contains("Describe this diagram"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::candidate_body("A free-body diagram.")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let text = client
            .generate_from_image("Describe this diagram", &[0x89, 0x50], "image/png")
            .await
            .unwrap();
        assert_eq!(text, "A free-body diagram.");
    }

    #[tokio::test]
    async fn test_stream_text_collects_fragments_in_order() {
        let server = MockServer::start().await;

        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Keep \"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"going.\"}]}}]}\n\n",
        );

        test_support::post_path_regex(test_support::STREAM_GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.as_bytes().to_vec(), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let client = make_client(&server);
        let mut collected = String::new();
        client
            .stream_text("motivate me", &mut |chunk: &str| collected.push_str(chunk))
            .await
            .unwrap();
        assert_eq!(collected, "Keep going.");
    }

    #[tokio::test]
    async fn test_stream_text_retries_transient_failures() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::STREAM_GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let body = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"ok\"}]}}]}\n\n";
        test_support::post_path_regex(test_support::STREAM_GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.as_bytes().to_vec(), "text/event-stream"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let mut collected = String::new();
        client
            .stream_text("prompt", &mut |chunk: &str| collected.push_str(chunk))
            .await
            .unwrap();
        assert_eq!(collected, "ok");
    }
}
