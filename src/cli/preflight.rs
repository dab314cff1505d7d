//! Pre-flight checks before a generation run.
//!
//! Nothing here is fatal: a missing credential or tool only fails the stages
//! that need it, so the checks produce warnings for the user up front.

use crate::config::{Credentials, Settings};
use std::process::Command;

/// Collect warnings about anything that will make a stage fail.
pub fn warnings(settings: &Settings, credentials: &Credentials) -> Vec<String> {
    let mut warnings = Vec::new();

    if credentials.openai_api_key.is_none() {
        warnings.push(format!(
            "{} not set: summary, thumbnail and quiz will fail",
            Credentials::OPENAI_ENV
        ));
    }
    if credentials.fal_key.is_none() {
        warnings.push(format!(
            "{} not set: narration will fail",
            Credentials::FAL_ENV
        ));
    }
    if settings.pipeline.enable_video_search && !tool_available(&settings.video_search.ytdlp_path)
    {
        warnings.push(format!(
            "{} not found: video search will fail",
            settings.video_search.ytdlp_path
        ));
    }

    warnings
}

/// Whether an external tool answers `--version`.
pub fn tool_available(name: &str) -> bool {
    Command::new(name)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
