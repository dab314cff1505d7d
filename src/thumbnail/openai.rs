//! OpenAI image generation implementation.

use super::{ImageArtifact, ThumbnailGenerator};
use crate::config::{Credentials, Settings};
use crate::error::{PrimerError, Result};
use crate::openai::{classify_error, create_optional_client};
use async_openai::types::{
    CreateImageRequestArgs, Image, ImageModel, ImageResponseFormat, ImageSize,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// DALL-E based thumbnail generator. One 1024x1024 image per request.
pub struct DalleThumbnailer {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl DalleThumbnailer {
    /// Create a new thumbnailer. Without a key every call fails with
    /// `CredentialMissing`.
    pub fn new(
        api_key: Option<&str>,
        api_base: Option<&str>,
        timeout: Duration,
        model: &str,
    ) -> Result<Self> {
        Ok(Self {
            client: create_optional_client(api_key, api_base, timeout)?,
            model: model.to_string(),
        })
    }

    /// Create a thumbnailer from application settings.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        Self::new(
            credentials.openai_api_key.as_deref(),
            settings.openai.api_base.as_deref(),
            Duration::from_secs(settings.openai.timeout_secs),
            &settings.thumbnail.model,
        )
    }

    fn image_model(&self) -> ImageModel {
        match self.model.as_str() {
            "dall-e-3" => ImageModel::DallE3,
            "dall-e-2" => ImageModel::DallE2,
            other => ImageModel::Other(other.to_string()),
        }
    }
}

#[async_trait]
impl ThumbnailGenerator for DalleThumbnailer {
    #[instrument(skip(self, prompt), fields(prompt_chars = prompt.chars().count()))]
    async fn generate(&self, prompt: &str) -> Result<ImageArtifact> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| PrimerError::CredentialMissing(Credentials::OPENAI_ENV.to_string()))?;

        if prompt.trim().is_empty() {
            return Err(PrimerError::InvalidInput(
                "Thumbnail prompt must not be empty".to_string(),
            ));
        }

        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(self.image_model())
            .n(1)
            .size(ImageSize::S1024x1024)
            .response_format(ImageResponseFormat::Url)
            .build()
            .map_err(|e| PrimerError::InvalidInput(format!("Failed to build image request: {}", e)))?;

        debug!("Requesting thumbnail from {}", self.model);
        let response = client
            .images()
            .create(request)
            .await
            .map_err(|e| classify_error("Image generation", e))?;

        let image = response
            .data
            .first()
            .ok_or_else(|| PrimerError::ProviderRejected("No image returned".to_string()))?;

        match image.as_ref() {
            Image::Url {
                url,
                revised_prompt,
            } if url::Url::parse(url).is_ok() => {
                info!("Thumbnail generated: {}", url);
                Ok(ImageArtifact {
                    url: url.clone(),
                    revised_prompt: revised_prompt.clone(),
                })
            }
            _ => Err(PrimerError::ProviderRejected(
                "Image response carried no usable URL".to_string(),
            )),
        }
    }
}
