//! Configuration settings for Primer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub credentials: CredentialSettings,
    pub openai: OpenAISettings,
    pub summary: SummarySettings,
    pub video_search: VideoSearchSettings,
    pub narration: NarrationSettings,
    pub thumbnail: ThumbnailSettings,
    pub quiz: QuizSettings,
    pub pipeline: PipelineSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where generated files (quiz PDF, run reports) are written.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "./primer-output".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Provider credentials.
///
/// Values left unset here are looked up once in the environment
/// (`OPENAI_API_KEY`, `FAL_KEY`) when the providers are built.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CredentialSettings {
    pub openai_api_key: Option<String>,
    pub fal_key: Option<String>,
}

/// Resolved credentials handed to provider clients at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub fal_key: Option<String>,
}

impl Credentials {
    pub const OPENAI_ENV: &'static str = "OPENAI_API_KEY";
    pub const FAL_ENV: &'static str = "FAL_KEY";

    /// Resolve from settings, falling back to the process environment.
    pub fn resolve(settings: &CredentialSettings) -> Self {
        Self::resolve_with(settings, |name| std::env::var(name).ok())
    }

    /// Resolve with a custom environment lookup.
    pub fn resolve_with(
        settings: &CredentialSettings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let pick = |configured: &Option<String>, name: &str| {
            configured
                .clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(name).filter(|v| !v.trim().is_empty()))
        };
        Self {
            openai_api_key: pick(&settings.openai_api_key, Self::OPENAI_ENV),
            fal_key: pick(&settings.fal_key, Self::FAL_ENV),
        }
    }

    /// Names of credentials that are not available.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openai_api_key.is_none() {
            missing.push(Self::OPENAI_ENV);
        }
        if self.fal_key.is_none() {
            missing.push(Self::FAL_ENV);
        }
        missing
    }
}

/// Mask a secret for display, keeping a short prefix and suffix.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// Shared OpenAI client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// Override the API base URL (e.g. for a proxy).
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Summary agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Chat model used by the summary agent.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
        }
    }
}

/// Competitor video search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSearchSettings {
    /// Path or name of the yt-dlp binary.
    pub ytdlp_path: String,
    /// Number of videos to return.
    pub limit: usize,
    /// Timeout for the search process in seconds.
    pub timeout_secs: u64,
}

impl Default for VideoSearchSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            limit: 5,
            timeout_secs: 60,
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    /// Base URL of the synthesis service.
    pub api_base: String,
    /// Model identifier appended to the base URL.
    pub model: String,
    /// Voice identifier.
    pub voice: String,
    /// Characters of summary sent for narration before truncation.
    pub max_chars: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            api_base: "https://fal.run".to_string(),
            model: "fal-ai/elevenlabs/tts/turbo-v2.5".to_string(),
            voice: "21m00Tcm4TlvDq8ikWAM".to_string(),
            max_chars: 2500,
            timeout_secs: 120,
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    /// Image model.
    pub model: String,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            model: "dall-e-3".to_string(),
        }
    }
}

/// Quiz generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Chat model used to write the quiz.
    pub model: String,
    /// Number of multiple-choice questions requested.
    pub question_count: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            question_count: 50,
        }
    }
}

/// Which optional stages run, and how long any stage may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub enable_video_search: bool,
    pub enable_thumbnail: bool,
    pub enable_quiz: bool,
    /// Upper bound on a single stage, in seconds.
    pub stage_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            enable_video_search: true,
            enable_thumbnail: true,
            enable_quiz: true,
            stage_timeout_secs: 180,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::PrimerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// A copy safe to print: credentials are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.credentials.openai_api_key = copy.credentials.openai_api_key.as_deref().map(mask_secret);
        copy.credentials.fal_key = copy.credentials.fal_key.as_deref().map(mask_secret);
        copy
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("primer")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.narration.max_chars, 2500);
        assert_eq!(settings.quiz.question_count, 50);
        assert_eq!(settings.video_search.limit, 5);
        assert!(settings.pipeline.enable_quiz);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [pipeline]
            enable_thumbnail = false

            [quiz]
            question_count = 20
            "#,
        )
        .unwrap();
        assert!(!settings.pipeline.enable_thumbnail);
        assert!(settings.pipeline.enable_video_search);
        assert_eq!(settings.quiz.question_count, 20);
        assert_eq!(settings.quiz.model, "gpt-4o-mini");
    }

    #[test]
    fn test_credentials_prefer_config_over_env() {
        let configured = CredentialSettings {
            openai_api_key: Some("sk-from-config".to_string()),
            fal_key: None,
        };
        let creds = Credentials::resolve_with(&configured, |name| match name {
            "OPENAI_API_KEY" => Some("sk-from-env".to_string()),
            "FAL_KEY" => Some("fal-from-env".to_string()),
            _ => None,
        });
        assert_eq!(creds.openai_api_key.as_deref(), Some("sk-from-config"));
        assert_eq!(creds.fal_key.as_deref(), Some("fal-from-env"));
        assert!(creds.missing().is_empty());
    }

    #[test]
    fn test_blank_credentials_are_missing() {
        let configured = CredentialSettings {
            openai_api_key: Some("  ".to_string()),
            fal_key: None,
        };
        let creds = Credentials::resolve_with(&configured, |_| None);
        assert_eq!(creds.missing(), vec!["OPENAI_API_KEY", "FAL_KEY"]);
    }

    #[test]
    fn test_redacted_masks_keys() {
        let mut settings = Settings::default();
        settings.credentials.fal_key = Some("abcd1234efgh5678ijkl".to_string());
        let redacted = settings.redacted();
        assert_eq!(redacted.credentials.fal_key.as_deref(), Some("abcd...ijkl"));
    }
}
