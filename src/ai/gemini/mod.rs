pub mod chat;
pub mod client;
pub mod generation;
pub mod quiz;
pub mod study;
pub mod types;

pub use chat::GeminiChatClient;
pub use generation::GeminiGenerationClient;
pub use quiz::GeminiQuizClient;
pub use study::GeminiStudyClient;

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Adds a test-only `with_base_url` to a capability client wrapping a
/// `GeminiHttpClient` in a field named `http`.
#[cfg(test)]
macro_rules! impl_with_gemini_base_url {
    ($client:ty) => {
        impl $client {
            fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}

#[cfg(test)]
pub(crate) use impl_with_gemini_base_url;

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockBuilder};

    pub const GENERATE_CONTENT_PATH_REGEX: &str = r"/v1beta/models/.+:generateContent";
    pub const STREAM_GENERATE_CONTENT_PATH_REGEX: &str =
        r"/v1beta/models/.+:streamGenerateContent";

    pub fn post_path_regex(pattern: &str) -> MockBuilder {
        Mock::given(method("POST")).and(path_regex(pattern))
    }

    /// Response body with a single text candidate, as Gemini returns it.
    pub fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": text }]
                }
            }]
        })
    }
}
