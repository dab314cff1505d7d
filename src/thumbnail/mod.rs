//! Thumbnail image generation.

mod openai;

pub use openai::DalleThumbnailer;

use crate::config::Prompts;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

/// A generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageArtifact {
    pub url: String,
    /// Prompt as rewritten by the provider, when it reports one.
    pub revised_prompt: Option<String>,
}

/// Trait for thumbnail generation.
#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    /// Generate a single square thumbnail for the prompt.
    async fn generate(&self, prompt: &str) -> Result<ImageArtifact>;
}

/// Build the thumbnail prompt from the topic and the full summary text.
pub fn build_thumbnail_prompt(prompts: &Prompts, topic: &str, summary: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("topic".to_string(), topic.to_string());
    vars.insert("summary".to_string(), summary.to_string());
    prompts.render_with_custom(&prompts.thumbnail.template, &vars)
}
