//! Mock service implementations for tests and local harnesses.
//!
//! Each mock cycles through scripted responses (or falls back to a fixed
//! default) and counts calls so tests can assert interaction.

use crate::ai::{ChatService, GenerationService, QuizService, StudyService};
use crate::error::GenerationError;
use crate::models::{
    ChatExchange, ConversationHistory, PerformanceSummary, QuizQuestion, SolutionDetail,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockGenerationClient {
    text_responses: Arc<Mutex<Vec<String>>>,
    last_prompt: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_response(self, response: String) -> Self {
        self.text_responses.lock().unwrap().push(response);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The most recent prompt any operation received.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    fn next_response(&self, prompt: &str) -> String {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        let responses = self.text_responses.lock().unwrap();
        if responses.is_empty() {
            "Mock generated text".to_string()
        } else {
            responses[(*count - 1) % responses.len()].clone()
        }
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(self.next_response(prompt))
    }

    async fn stream_text(
        &self,
        prompt: &str,
        on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), GenerationError> {
        // Deliver the scripted text in word-sized fragments that concatenate
        // back to the full response.
        let response = self.next_response(prompt);
        for chunk in response.split_inclusive(' ') {
            on_chunk(chunk);
        }
        Ok(())
    }

    async fn generate_from_image(
        &self,
        prompt: &str,
        _image_bytes: &[u8],
        _mime_type: &str,
    ) -> Result<String, GenerationError> {
        Ok(self.next_response(prompt))
    }
}

#[derive(Clone, Default)]
pub struct MockChatClient {
    replies: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: String) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn send_message(
        &self,
        prompt: &str,
        history: &ConversationHistory,
    ) -> Result<ChatExchange, GenerationError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let replies = self.replies.lock().unwrap();
        let reply = if replies.is_empty() {
            "Mock tutor reply".to_string()
        } else {
            replies[(*count - 1) % replies.len()].clone()
        };

        Ok(ChatExchange {
            history: history.with_exchange(prompt, &reply),
            reply,
        })
    }
}

#[derive(Clone, Default)]
pub struct MockQuizClient {
    questions: Arc<Mutex<Vec<QuizQuestion>>>,
    solutions: Arc<Mutex<Vec<SolutionDetail>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockQuizClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_question(self, question: QuizQuestion) -> Self {
        self.questions.lock().unwrap().push(question);
        self
    }

    pub fn with_solution(self, solution: SolutionDetail) -> Self {
        self.solutions.lock().unwrap().push(solution);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl QuizService for MockQuizClient {
    async fn generate_question(
        &self,
        subject: &str,
        difficulty: &str,
        topic: &str,
    ) -> Result<QuizQuestion, GenerationError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let questions = self.questions.lock().unwrap();
        if questions.is_empty() {
            Ok(QuizQuestion {
                question: format!("{} {} question on {}", difficulty, subject, topic),
                options: vec![
                    "Option A".to_string(),
                    "Option B".to_string(),
                    "Option C".to_string(),
                    "Option D".to_string(),
                ],
                correct: 0,
                solution: "Mock solution".to_string(),
                explanation: "Mock explanation".to_string(),
            })
        } else {
            Ok(questions[(*count - 1) % questions.len()].clone())
        }
    }

    async fn generate_solution(
        &self,
        question: &str,
        _options: &[String],
        _correct: usize,
    ) -> Result<SolutionDetail, GenerationError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let solutions = self.solutions.lock().unwrap();
        if solutions.is_empty() {
            Ok(SolutionDetail {
                solution: format!("Worked solution for: {}", question),
                explanation: "Mock explanation".to_string(),
                key_insight: "Mock insight".to_string(),
            })
        } else {
            Ok(solutions[(*count - 1) % solutions.len()].clone())
        }
    }
}

#[derive(Clone, Default)]
pub struct MockStudyClient {
    recommendations: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockStudyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recommendations(self, text: String) -> Self {
        self.recommendations.lock().unwrap().push(text);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl StudyService for MockStudyClient {
    async fn generate_recommendations(
        &self,
        summary: &PerformanceSummary,
    ) -> Result<String, GenerationError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let recommendations = self.recommendations.lock().unwrap();
        if recommendations.is_empty() {
            let weak: Vec<&str> = summary
                .weak_areas
                .iter()
                .map(|area| area.topic.as_str())
                .collect();
            Ok(format!(
                "For {}, focus on {}",
                summary.exam,
                weak.join(", ")
            ))
        } else {
            Ok(recommendations[(*count - 1) % recommendations.len()].clone())
        }
    }
}
