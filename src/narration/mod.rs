//! Narration: speech synthesis of the summary text.

mod fal;

pub use fal::FalNarrator;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Voice selector understood by the synthesis provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceId(pub String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A playable audio resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioArtifact {
    pub url: String,
    pub content_type: Option<String>,
}

/// Trait for speech synthesis.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Synthesize `text`, which must already fit the provider's character ceiling.
    async fn synthesize(&self, text: &str, voice: &VoiceId) -> Result<AudioArtifact>;
}
