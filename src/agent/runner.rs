//! Language-model summary agent.

use super::{SummaryMetadata, SummaryResult, Summarizer};
use crate::config::{Credentials, Prompts, Settings};
use crate::error::{PrimerError, Result};
use crate::openai::{complete, create_optional_client};
use crate::topic::Topic;
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Agent that summarizes a topic with a fixed teaching-assistant persona.
pub struct SummaryAgent {
    client: Option<Client<OpenAIConfig>>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl SummaryAgent {
    /// Create a new agent. Without an API key every call fails with
    /// `CredentialMissing` before touching the network.
    pub fn new(
        api_key: Option<&str>,
        api_base: Option<&str>,
        timeout: Duration,
        model: &str,
    ) -> Result<Self> {
        Ok(Self {
            client: create_optional_client(api_key, api_base, timeout)?,
            model: model.to_string(),
            temperature: 0.0,
            prompts: Prompts::default(),
        })
    }

    /// Create an agent from application settings.
    pub fn from_settings(
        settings: &Settings,
        credentials: &Credentials,
        prompts: Prompts,
    ) -> Result<Self> {
        Ok(Self::new(
            credentials.openai_api_key.as_deref(),
            settings.openai.api_base.as_deref(),
            Duration::from_secs(settings.openai.timeout_secs),
            &settings.summary.model,
        )?
        .with_temperature(settings.summary.temperature)
        .with_prompts(prompts))
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Run the agent on a task string.
    pub async fn run(&self, task: &str) -> Result<SummaryResult> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| PrimerError::CredentialMissing(Credentials::OPENAI_ENV.to_string()))?;

        if task.trim().is_empty() {
            return Err(PrimerError::InvalidInput(
                "Summary task must not be empty".to_string(),
            ));
        }

        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), task.to_string());
        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.user, &vars);

        debug!("Requesting summary from {}", self.model);
        let completion = complete(
            client,
            &self.model,
            &self.prompts.summary.system,
            &user_prompt,
            self.temperature,
            "Summary agent",
        )
        .await?;

        if completion.text.is_empty() {
            return Err(PrimerError::Agent("Empty response from model".to_string()));
        }

        info!("Summary generated ({} chars)", completion.text.chars().count());

        Ok(SummaryResult {
            text: completion.text,
            metadata: SummaryMetadata {
                model: completion.model,
                response_id: completion.response_id,
                finish_reason: completion.finish_reason,
                prompt_tokens: completion.prompt_tokens,
                completion_tokens: completion.completion_tokens,
            },
        })
    }
}

#[async_trait]
impl Summarizer for SummaryAgent {
    #[instrument(skip(self), fields(topic = %topic))]
    async fn summarize(&self, topic: &Topic) -> Result<SummaryResult> {
        self.run(&topic.canonical()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::test_support::{api_error, chat_response};
    use crate::topic::Subject;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn agent_for(server: &MockServer, key: Option<&str>) -> SummaryAgent {
        let base = format!("{}/v1", server.uri());
        SummaryAgent::new(key, Some(&base), Duration::from_secs(5), "gpt-4o-mini").unwrap()
    }

    #[tokio::test]
    async fn test_summarize_sends_topic_and_persona() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("NCERT Class 10 Science Chapter 1"))
            .and(body_string_contains("teaching assistant"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_response("Chemical reactions and equations...")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let agent = agent_for(&server, Some("sk-test"));
        let topic = Topic::chapter(10, Subject::Science, 1).unwrap();
        let summary = agent.summarize(&topic).await.unwrap();

        assert_eq!(summary.text, "Chemical reactions and equations...");
        assert_eq!(summary.metadata.finish_reason.as_deref(), Some("stop"));
        assert_eq!(summary.metadata.completion_tokens, Some(34));
    }

    #[tokio::test]
    async fn test_empty_answer_is_agent_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("   ")))
            .mount(&server)
            .await;

        let agent = agent_for(&server, Some("sk-test"));
        let err = agent.run("Light").await.unwrap_err();
        assert!(matches!(err, PrimerError::Agent(_)));
    }

    #[tokio::test]
    async fn test_rejected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(api_error("bad model")))
            .mount(&server)
            .await;

        let agent = agent_for(&server, Some("sk-test"));
        let err = agent.run("Light").await.unwrap_err();
        assert!(matches!(err, PrimerError::ProviderRejected(_)));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let agent = agent_for(&server, None);
        let err = agent.run("Light").await.unwrap_err();
        assert!(matches!(err, PrimerError::CredentialMissing(_)));
    }
}
