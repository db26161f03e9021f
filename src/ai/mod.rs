//! AI tutoring services backed by Gemini text generation.
//!
//! Capability traits split the generation client by what callers need: plain
//! text generation (including streaming and image-grounded prompts), chat
//! with caller-owned history, structured quiz content, and study
//! recommendations. Gemini implementations share one HTTP core; mock
//! implementations back the app-level tests.

pub mod extract;
pub mod gemini;
pub mod mock;
pub mod retry;

pub use gemini::{
    GeminiChatClient, GeminiGenerationClient, GeminiQuizClient, GeminiStudyClient,
};
pub use mock::{MockChatClient, MockGenerationClient, MockQuizClient, MockStudyClient};
pub use retry::RetryPolicy;

use crate::error::GenerationError;
use crate::models::{ChatExchange, ConversationHistory, PerformanceSummary, QuizQuestion, SolutionDetail};
use async_trait::async_trait;

/// Plain text generation against the remote model.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// One-shot prompt to text.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Streams the response, invoking `on_chunk` once per text fragment in
    /// arrival order. Fragments are delivered strictly sequentially; the
    /// callback is never invoked concurrently with itself.
    async fn stream_text(
        &self,
        prompt: &str,
        on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), GenerationError>;

    /// Prompt grounded in an image. Bytes are base64-encoded and submitted
    /// together with the text as one multi-part request.
    async fn generate_from_image(
        &self,
        prompt: &str,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<String, GenerationError>;
}

/// Conversational exchange threading a caller-owned history.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Submits the full prior history plus `prompt`, returning the reply and
    /// a new history extended by exactly two turns. The input history is
    /// never mutated.
    async fn send_message(
        &self,
        prompt: &str,
        history: &ConversationHistory,
    ) -> Result<ChatExchange, GenerationError>;
}

/// Structured quiz content extracted from free-form model output.
#[async_trait]
pub trait QuizService: Send + Sync {
    async fn generate_question(
        &self,
        subject: &str,
        difficulty: &str,
        topic: &str,
    ) -> Result<QuizQuestion, GenerationError>;

    /// Worked solution for an existing question. `correct` indexes into
    /// `options`.
    async fn generate_solution(
        &self,
        question: &str,
        options: &[String],
        correct: usize,
    ) -> Result<SolutionDetail, GenerationError>;
}

/// Personalized study guidance from a performance snapshot.
#[async_trait]
pub trait StudyService: Send + Sync {
    async fn generate_recommendations(
        &self,
        summary: &PerformanceSummary,
    ) -> Result<String, GenerationError>;
}
