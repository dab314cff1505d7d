//! Summary agent: turns a topic into study notes.

mod runner;

pub use runner::SummaryAgent;

use crate::error::Result;
use crate::topic::Topic;
use async_trait::async_trait;
use serde::Serialize;

/// Bookkeeping reported by the language-model provider.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SummaryMetadata {
    pub model: String,
    pub response_id: String,
    pub finish_reason: Option<String>,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

/// Summary text produced once per pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResult {
    pub text: String,
    pub metadata: SummaryMetadata,
}

/// Trait for summary generation.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the topic's important topics and sub topics.
    async fn summarize(&self, topic: &Topic) -> Result<SummaryResult>;
}
