//! Quiz generation through a chat completion.

use super::render::{layout_pages, render_pdf};
use super::{QuizDocument, QuizGenerator};
use crate::config::{Credentials, Prompts, Settings};
use crate::error::{PrimerError, Result};
use crate::openai::{complete, create_optional_client};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const PDF_TITLE: &str = "Multiple Choice Questions";

/// Render the user prompt asking for exactly `count` questions.
pub fn build_quiz_prompt(prompts: &Prompts, source_text: &str, count: usize) -> String {
    let mut vars = HashMap::new();
    vars.insert("count".to_string(), count.to_string());
    vars.insert("source_text".to_string(), source_text.to_string());
    prompts.render_with_custom(&prompts.quiz.user, &vars)
}

/// Quiz generator backed by an OpenAI chat model.
pub struct OpenAIQuizGenerator {
    client: Option<Client<OpenAIConfig>>,
    model: String,
    prompts: Prompts,
}

impl OpenAIQuizGenerator {
    pub fn new(
        api_key: Option<&str>,
        api_base: Option<&str>,
        timeout: Duration,
        model: &str,
    ) -> Result<Self> {
        Ok(Self {
            client: create_optional_client(api_key, api_base, timeout)?,
            model: model.to_string(),
            prompts: Prompts::default(),
        })
    }

    pub fn from_settings(
        settings: &Settings,
        credentials: &Credentials,
        prompts: Prompts,
    ) -> Result<Self> {
        Ok(Self::new(
            credentials.openai_api_key.as_deref(),
            settings.openai.api_base.as_deref(),
            Duration::from_secs(settings.openai.timeout_secs),
            &settings.quiz.model,
        )?
        .with_prompts(prompts))
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait]
impl QuizGenerator for OpenAIQuizGenerator {
    #[instrument(skip(self, source_text), fields(source_chars = source_text.chars().count()))]
    async fn generate_quiz(&self, source_text: &str, count: usize) -> Result<QuizDocument> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| PrimerError::CredentialMissing(Credentials::OPENAI_ENV.to_string()))?;

        if count == 0 {
            return Err(PrimerError::InvalidInput(
                "Question count must be at least 1".to_string(),
            ));
        }
        if source_text.trim().is_empty() {
            return Err(PrimerError::InvalidInput(
                "Quiz source text must not be empty".to_string(),
            ));
        }

        let user_prompt = build_quiz_prompt(&self.prompts, source_text, count);
        debug!("Requesting {} questions from {}", count, self.model);

        let completion = complete(
            client,
            &self.model,
            &self.prompts.quiz.system,
            &user_prompt,
            0.0,
            "Quiz generation",
        )
        .await?;

        if completion.text.is_empty() {
            return Err(PrimerError::ProviderRejected(
                "Quiz model returned no text".to_string(),
            ));
        }

        let layout = layout_pages(&completion.text);
        if layout.transliterated_lines > 0 {
            warn!(
                "{} quiz lines contained non-ASCII characters and were transliterated",
                layout.transliterated_lines
            );
        }
        let rendered_bytes = render_pdf(PDF_TITLE, &layout)?;

        info!(
            "Quiz rendered: {} pages, {} bytes",
            layout.pages.len(),
            rendered_bytes.len()
        );

        Ok(QuizDocument {
            raw_text: completion.text,
            rendered_bytes,
            requested_items: count,
            page_count: layout.pages.len(),
            transliterated_lines: layout.transliterated_lines,
        })
    }
}
