//! fal.ai text-to-speech implementation.
//!
//! The ElevenLabs endpoint on fal has accepted the voice selector under two
//! names over time, so a rejected request is retried once with the other one.

use super::{AudioArtifact, Narrator, VoiceId};
use crate::config::{Credentials, NarrationSettings};
use crate::error::{PrimerError, Result};
use crate::truncate::truncated_ceiling;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Name under which the voice selector is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoiceParameter {
    Voice,
    VoiceId,
}

impl VoiceParameter {
    fn key(self) -> &'static str {
        match self {
            VoiceParameter::Voice => "voice",
            VoiceParameter::VoiceId => "voice_id",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FalFile {
    url: Option<String>,
    content_type: Option<String>,
}

/// Response shapes seen from the endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FalAudioResponse {
    audio_url: Option<String>,
    url: Option<String>,
    audio: Option<FalFile>,
}

impl FalAudioResponse {
    fn into_artifact(self) -> Option<AudioArtifact> {
        let content_type = self.audio.as_ref().and_then(|a| a.content_type.clone());
        let url = [
            self.audio_url,
            self.url,
            self.audio.and_then(|a| a.url),
        ]
        .into_iter()
        .flatten()
        .map(|u| u.trim().to_string())
        .find(|u| url::Url::parse(u).is_ok())?;

        Some(AudioArtifact { url, content_type })
    }
}

/// Speech synthesis through fal.ai's synchronous run endpoint.
pub struct FalNarrator {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    max_input_chars: usize,
}

impl FalNarrator {
    /// Create a narrator from settings and an optional key.
    ///
    /// Input longer than `max_chars` plus the truncation marker is refused.
    pub fn new(settings: &NarrationSettings, api_key: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| PrimerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()).map(|k| k.to_string()),
            endpoint: format!(
                "{}/{}",
                settings.api_base.trim_end_matches('/'),
                settings.model.trim_start_matches('/')
            ),
            max_input_chars: truncated_ceiling(settings.max_chars),
        })
    }

    /// One request with the voice under the given parameter name.
    async fn attempt(
        &self,
        api_key: &str,
        text: &str,
        voice: &VoiceId,
        parameter: VoiceParameter,
    ) -> Result<AudioArtifact> {
        let mut body = json!({ "text": text });
        body[parameter.key()] = json!(voice.as_str());

        debug!("Requesting speech with '{}' parameter", parameter.key());

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Key {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| PrimerError::ProviderCommunication(format!("Speech request failed: {}", e)))?;

        let status = response.status();
        if status.is_server_error() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PrimerError::ProviderCommunication(format!(
                "Speech service error (HTTP {}): {}",
                status, detail
            )));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PrimerError::ProviderRejected(format!(
                "'{}' parameter rejected (HTTP {}): {}",
                parameter.key(),
                status,
                detail
            )));
        }

        let payload: FalAudioResponse = response.json().await.map_err(|e| {
            PrimerError::ProviderRejected(format!("Unreadable speech response: {}", e))
        })?;

        payload.into_artifact().ok_or_else(|| {
            PrimerError::ProviderRejected("Speech response carried no audio URL".to_string())
        })
    }
}

#[async_trait]
impl Narrator for FalNarrator {
    #[instrument(skip(self, text), fields(chars = text.chars().count(), voice = %voice))]
    async fn synthesize(&self, text: &str, voice: &VoiceId) -> Result<AudioArtifact> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PrimerError::CredentialMissing(Credentials::FAL_ENV.to_string()))?;

        let len = text.chars().count();
        if len > self.max_input_chars {
            return Err(PrimerError::ArtifactTooLarge {
                len,
                limit: self.max_input_chars,
            });
        }
        if text.trim().is_empty() {
            return Err(PrimerError::InvalidInput(
                "Narration text must not be empty".to_string(),
            ));
        }

        let artifact = match self.attempt(api_key, text, voice, VoiceParameter::Voice).await {
            Err(PrimerError::ProviderRejected(reason)) => {
                warn!("First attempt rejected: {}. Retrying with 'voice_id'", reason);
                self.attempt(api_key, text, voice, VoiceParameter::VoiceId)
                    .await?
            }
            other => other?,
        };

        info!("Audio generated: {}", artifact.url);
        Ok(artifact)
    }
}
