//! Configuration module for Primer.
//!
//! Handles loading and managing application settings, credentials and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QuizPrompts, SummaryPrompts, ThumbnailPrompts};
pub use settings::{
    mask_secret, CredentialSettings, Credentials, GeneralSettings, NarrationSettings,
    OpenAISettings, PipelineSettings, PromptSettings, QuizSettings, Settings, SummarySettings,
    ThumbnailSettings, VideoSearchSettings,
};
