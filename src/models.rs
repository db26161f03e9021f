//! Data models and structures
//!
//! Defines the core data structures for conversations, quiz content,
//! performance summaries, and configuration.

use serde::{Deserialize, Serialize};

/// Speaker tag for one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Ordered chat transcript owned by the caller.
///
/// The generation clients never store one. `ChatService` takes the prior
/// history by reference and hands back an extended copy, so a caller can keep
/// threading the same value across exchanges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns a copy of this history with a user/assistant exchange appended.
    pub fn with_exchange(&self, prompt: &str, reply: &str) -> Self {
        let mut turns = self.turns.clone();
        turns.push(Turn {
            role: Role::User,
            text: prompt.to_string(),
        });
        turns.push(Turn {
            role: Role::Assistant,
            text: reply.to_string(),
        });
        Self { turns }
    }
}

/// Result of one chat exchange: the model's reply plus the extended history.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub reply: String,
    pub history: ConversationHistory,
}

/// Multiple-choice practice question as emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    /// Exactly four answer options by convention; not schema-enforced.
    pub options: Vec<String>,
    /// Index into `options` (0-3).
    pub correct: usize,
    pub solution: String,
    pub explanation: String,
}

/// Worked solution for an existing question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionDetail {
    pub solution: String,
    pub explanation: String,
    pub key_insight: String,
}

/// Per-topic accuracy percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAccuracy {
    pub topic: String,
    pub accuracy: u32,
}

/// Snapshot of a student's performance, serialized verbatim into the
/// recommendations prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub weak_areas: Vec<TopicAccuracy>,
    pub strengths: Vec<TopicAccuracy>,
    pub recent_scores: Vec<u32>,
    pub exam: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub model: String,
    pub default_exam: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?,
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| crate::ai::gemini::DEFAULT_MODEL.to_string()),
            default_exam: std::env::var("EXAM_FOCUS").unwrap_or_else(|_| "JEE".to_string()),
        })
    }
}
