//! Tutoring flows built on top of the generation services.
//!
//! `TutorApp` is the caller side of the generation client: it owns the
//! running chat transcript, wraps student questions in the tutor preamble,
//! and turns performance snapshots into recommendation prompts.

use crate::ai::{
    ChatService, GeminiChatClient, GeminiGenerationClient, GeminiQuizClient, GeminiStudyClient,
    GenerationService, QuizService, StudyService,
};
use crate::models::{Config, ConversationHistory, PerformanceSummary, QuizQuestion, SolutionDetail};
use crate::{prompts, Result};
use tracing::info;

/// Coordinates chat, quiz, and study flows for one exam focus.
pub struct TutorApp {
    generation: Box<dyn GenerationService>,
    chat: Box<dyn ChatService>,
    quiz: Box<dyn QuizService>,
    study: Box<dyn StudyService>,
    exam: String,
    history: ConversationHistory,
}

/// Injectable service bundle used to construct [`TutorApp`] in
/// tests/harnesses.
pub struct TutorServices {
    pub generation: Box<dyn GenerationService>,
    pub chat: Box<dyn ChatService>,
    pub quiz: Box<dyn QuizService>,
    pub study: Box<dyn StudyService>,
}

impl TutorApp {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: TutorServices, exam: String) -> Self {
        Self {
            generation: services.generation,
            chat: services.chat,
            quiz: services.quiz,
            study: services.study,
            exam,
            history: ConversationHistory::new(),
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        info!("Gemini model: {}", config.model);

        // Reuse one HTTP connection pool across capability clients.
        let http_client = reqwest::Client::new();

        let generation = Box::new(GeminiGenerationClient::new_with_client(
            config.gemini_api_key.clone(),
            config.model.clone(),
            http_client.clone(),
        ));
        let chat = Box::new(GeminiChatClient::new_with_client(
            config.gemini_api_key.clone(),
            config.model.clone(),
            http_client.clone(),
        ));
        let quiz = Box::new(GeminiQuizClient::new_with_client(
            config.gemini_api_key.clone(),
            config.model.clone(),
            http_client.clone(),
        ));
        let study = Box::new(GeminiStudyClient::new_with_client(
            config.gemini_api_key,
            config.model,
            http_client,
        ));

        Ok(Self::with_services(
            TutorServices {
                generation,
                chat,
                quiz,
                study,
            },
            config.default_exam,
        ))
    }

    pub fn with_exam(mut self, exam: String) -> Self {
        self.exam = exam;
        self
    }

    pub fn exam(&self) -> &str {
        &self.exam
    }

    /// The running tutoring transcript.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Ask the tutor a question. The question is wrapped in the exam-specific
    /// preamble and the full transcript is threaded through, so follow-up
    /// questions keep their context.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let prompt = prompts::render(
            prompts::TUTOR_TURN,
            &[("exam", &self.exam), ("question", question)],
        );

        let exchange = self.chat.send_message(&prompt, &self.history).await?;
        self.history = exchange.history;
        Ok(exchange.reply)
    }

    /// One practice question for the demo quiz.
    pub async fn practice_question(
        &self,
        subject: &str,
        difficulty: &str,
        topic: &str,
    ) -> Result<QuizQuestion> {
        info!("[{}] Generating {} {} question", topic, difficulty, subject);
        Ok(self
            .quiz
            .generate_question(subject, difficulty, topic)
            .await?)
    }

    /// Worked solution for an existing question.
    pub async fn solution_walkthrough(
        &self,
        question: &str,
        options: &[String],
        correct: usize,
    ) -> Result<SolutionDetail> {
        Ok(self
            .quiz
            .generate_solution(question, options, correct)
            .await?)
    }

    /// Personalized study recommendations from a performance snapshot.
    pub async fn recommendations(&self, summary: &PerformanceSummary) -> Result<String> {
        Ok(self.study.generate_recommendations(summary).await?)
    }

    /// Structured study plan over a list of weak topics.
    pub async fn study_plan(&self, weak_topics: &[String]) -> Result<String> {
        let prompt = prompts::render(
            prompts::STUDY_PLAN,
            &[("exam", &self.exam), ("weak_topics", &weak_topics.join(", "))],
        );
        Ok(self.generation.generate_text(&prompt).await?)
    }

    /// Short motivational quote for the configured exam.
    pub async fn motivational_quote(&self) -> Result<String> {
        let prompt = prompts::render(prompts::QUOTE, &[("exam", &self.exam)]);
        Ok(self.generation.generate_text(&prompt).await?)
    }

    /// Streaming variant of [`Self::motivational_quote`].
    pub async fn stream_motivational_quote(
        &self,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<()> {
        let prompt = prompts::render(prompts::QUOTE, &[("exam", &self.exam)]);
        Ok(self.generation.stream_text(&prompt, on_chunk).await?)
    }

    /// Explains an uploaded figure or problem photo.
    pub async fn explain_image(
        &self,
        prompt: &str,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<String> {
        Ok(self
            .generation
            .generate_from_image(prompt, image_bytes, mime_type)
            .await?)
    }
}
