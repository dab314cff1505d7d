//! Error types for Primer.

use serde::Serialize;
use thiserror::Error;

/// Library-level error type for Primer operations.
#[derive(Error, Debug)]
pub enum PrimerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0} is not configured. Set it in the config file or export it as an environment variable.")]
    CredentialMissing(String),

    #[error("Provider communication failed: {0}")]
    ProviderCommunication(String),

    #[error("Provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Rendering failed: {0}")]
    Rendering(String),

    #[error("Artifact too large: {len} characters exceeds the provider limit of {limit}")]
    ArtifactTooLarge { len: usize, limit: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse classification of an error, reported alongside failed stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    CredentialMissing,
    ProviderCommunication,
    ProviderRejected,
    Rendering,
    ArtifactTooLarge,
    InvalidInput,
    Configuration,
}

impl PrimerError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PrimerError::CredentialMissing(_) => ErrorCategory::CredentialMissing,
            PrimerError::ProviderCommunication(_) | PrimerError::Http(_) | PrimerError::Io(_) => {
                ErrorCategory::ProviderCommunication
            }
            PrimerError::ProviderRejected(_) | PrimerError::Agent(_) | PrimerError::Json(_) => {
                ErrorCategory::ProviderRejected
            }
            PrimerError::Rendering(_) => ErrorCategory::Rendering,
            PrimerError::ArtifactTooLarge { .. } => ErrorCategory::ArtifactTooLarge,
            PrimerError::InvalidInput(_) => ErrorCategory::InvalidInput,
            PrimerError::Config(_) | PrimerError::TomlParse(_) | PrimerError::ToolNotFound(_) => {
                ErrorCategory::Configuration
            }
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::CredentialMissing => "credential missing",
            ErrorCategory::ProviderCommunication => "provider communication",
            ErrorCategory::ProviderRejected => "provider rejected",
            ErrorCategory::Rendering => "rendering",
            ErrorCategory::ArtifactTooLarge => "artifact too large",
            ErrorCategory::InvalidInput => "invalid input",
            ErrorCategory::Configuration => "configuration",
        };
        write!(f, "{}", name)
    }
}

/// Result type alias for Primer operations.
pub type Result<T> = std::result::Result<T, PrimerError>;
