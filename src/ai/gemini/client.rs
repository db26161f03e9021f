use super::types::GenerateContentResponse;
use crate::error::GenerationError;
use futures::StreamExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Lightweight Gemini REST client shared by the capability clients.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-1.5-flash`),
    /// not a `models/...`-prefixed path segment.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Calls Gemini's `generateContent` endpoint and decodes the response
    /// envelope. All failures come back classified.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!("Sending generateContent request to {}", self.model);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                GenerationError::classify(&format!("Failed to send request to Gemini: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::classify(&format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| {
            GenerationError::classify(&format!("Failed to read Gemini response: {}", e))
        })?;
        serde_json::from_str(&body).map_err(|e| {
            GenerationError::classify(&format!(
                "Failed to decode Gemini response envelope: {}",
                e
            ))
        })
    }

    /// Calls Gemini's `streamGenerateContent` endpoint (SSE) and forwards
    /// each text fragment to `on_chunk` in arrival order.
    ///
    /// Fragments are delivered strictly sequentially; the callback is only
    /// ever invoked from this task. No per-request timeout is applied: a
    /// healthy stream can legitimately outlive the non-streaming limit.
    pub async fn stream_generate_content<Req: Serialize>(
        &self,
        request: &Req,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<(), GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        tracing::debug!("Opening streamGenerateContent stream to {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                GenerationError::classify(&format!("Failed to send request to Gemini: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::classify(&format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| {
                GenerationError::classify(&format!("Gemini stream interrupted: {}", e))
            })?;
            pending.extend_from_slice(&bytes);

            // SSE events are line-delimited; buffer bytes until a full line
            // is available so multi-byte characters never split mid-chunk.
            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                deliver_sse_line(String::from_utf8_lossy(&line).trim(), on_chunk);
            }
        }

        // Trailing event without a final newline still carries a payload.
        if !pending.is_empty() {
            deliver_sse_line(String::from_utf8_lossy(&pending).trim(), on_chunk);
        }

        Ok(())
    }
}

fn deliver_sse_line(line: &str, on_chunk: &mut (dyn FnMut(&str) + Send)) {
    let Some(data) = line.strip_prefix("data:") else {
        return;
    };
    let data = data.trim_start();

    let envelope: GenerateContentResponse = match serde_json::from_str(data) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Skipping undecodable stream event ({}): {}", e, data);
            return;
        }
    };

    if let Some(text) = envelope.text() {
        if !text.is_empty() {
            on_chunk(&text);
        }
    }
}
