//! Multiple-choice quiz generation and PDF rendering.

mod generator;
pub mod render;

pub use generator::{build_quiz_prompt, OpenAIQuizGenerator};

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// A generated quiz: the model's raw text plus its rendered PDF.
#[derive(Debug, Clone, Serialize)]
pub struct QuizDocument {
    pub raw_text: String,
    #[serde(skip)]
    pub rendered_bytes: Vec<u8>,
    pub requested_items: usize,
    pub page_count: usize,
    /// Lines that contained characters outside ASCII and were transliterated.
    pub transliterated_lines: usize,
}

/// Trait for quiz generation.
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Generate a quiz of `count` questions drawn only from `source_text`.
    async fn generate_quiz(&self, source_text: &str, count: usize) -> Result<QuizDocument>;
}
