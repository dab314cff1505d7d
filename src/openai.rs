//! OpenAI client configuration with sensible defaults.

use crate::error::{PrimerError, Result};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (3 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Create an OpenAI client for an explicit API key.
///
/// The key is never read from or written to the process environment here;
/// callers resolve credentials once and pass them in.
pub fn create_client(
    api_key: &str,
    api_base: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PrimerError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Create a client only when a key is present.
pub fn create_optional_client(
    api_key: Option<&str>,
    api_base: Option<&str>,
    timeout: Duration,
) -> Result<Option<Client<OpenAIConfig>>> {
    api_key
        .filter(|k| !k.is_empty())
        .map(|k| create_client(k, api_base, timeout))
        .transpose()
}

/// Text and bookkeeping from a single chat completion.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub response_id: String,
    pub finish_reason: Option<String>,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

/// Run one system + user chat completion and return the first choice.
///
/// A missing or whitespace-only answer is reported as an empty string; callers
/// decide whether that is an error for their stage.
pub async fn complete(
    client: &Client<OpenAIConfig>,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
    context: &str,
) -> Result<Completion> {
    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system.to_string())
            .build()
            .map_err(|e| PrimerError::InvalidInput(format!("{}: {}", context, e)))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(user.to_string())
            .build()
            .map_err(|e| PrimerError::InvalidInput(format!("{}: {}", context, e)))?
            .into(),
    ];

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .temperature(temperature)
        .build()
        .map_err(|e| PrimerError::InvalidInput(format!("{}: {}", context, e)))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| classify_error(context, e))?;

    let choice = response.choices.first();
    let text = choice
        .and_then(|c| c.message.content.as_ref())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let finish_reason = choice
        .and_then(|c| c.finish_reason.as_ref())
        .and_then(|r| serde_json::to_value(r).ok())
        .and_then(|v| v.as_str().map(|s| s.to_string()));

    Ok(Completion {
        text,
        model: response.model,
        response_id: response.id,
        finish_reason,
        prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
        completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
    })
}

/// Map an OpenAI SDK error onto the provider error taxonomy.
pub fn classify_error(context: &str, err: OpenAIError) -> PrimerError {
    match err {
        OpenAIError::Reqwest(e) => {
            PrimerError::ProviderCommunication(format!("{}: {}", context, e))
        }
        OpenAIError::ApiError(e) => PrimerError::ProviderRejected(format!("{}: {}", context, e)),
        OpenAIError::JSONDeserialize(e) => {
            PrimerError::ProviderRejected(format!("{}: malformed response: {}", context, e))
        }
        other => PrimerError::ProviderRejected(format!("{}: {}", context, other)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_client_requires_key() {
        let timeout = Duration::from_secs(1);
        assert!(create_optional_client(None, None, timeout).unwrap().is_none());
        assert!(create_optional_client(Some(""), None, timeout).unwrap().is_none());
        assert!(create_optional_client(Some("sk-test"), None, timeout)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_api_errors_are_rejections() {
        let err = classify_error(
            "Summary",
            OpenAIError::InvalidArgument("bad model".to_string()),
        );
        assert!(matches!(err, PrimerError::ProviderRejected(_)));
    }
}
