//! Generation client and tutoring flows for the ExamAce exam-prep site.
//!
//! Wraps the Gemini text-generation API with a uniform error taxonomy,
//! retry with exponential backoff, and structured extraction for quiz
//! content, plus the tutoring flows (chat, study plans, recommendations)
//! built on top of it.

pub mod ai;
pub mod app;
pub mod error;
pub mod models;
pub mod prompts;

pub use error::{Error, GenerationError, GenerationErrorKind, Result};
