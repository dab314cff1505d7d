//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

#[cfg(windows)]
const FALLBACK_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const FALLBACK_EDITOR: &str = "nano";

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(&settings.redacted())
                .context("Could not render settings as TOML")?;
            Output::kv("File", &config_path.display().to_string());
            println!();
            println!("{}", rendered);
        }
        ConfigAction::Edit => edit(&settings, config_path)?,
        ConfigAction::Path => println!("{}", config_path.display()),
    }

    Ok(())
}

/// Open the settings file in the user's editor, writing defaults first if it is missing.
fn edit(settings: &Settings, config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        settings.save_to(&config_path.to_path_buf())?;
        Output::info(&format!(
            "No settings file yet; wrote defaults to {}",
            config_path.display()
        ));
    }

    let editor = resolve_editor(
        std::env::var("VISUAL").ok(),
        std::env::var("EDITOR").ok(),
    );

    match Command::new(&editor).arg(config_path).status() {
        Ok(status) if status.success() => {
            Output::success(&format!("Edited {}", config_path.display()))
        }
        Ok(status) => Output::warning(&format!("{} exited with {}", editor, status)),
        Err(e) => Output::error(&format!(
            "Could not launch '{}' ({}). Set VISUAL or EDITOR, or edit {} by hand.",
            editor,
            e,
            config_path.display()
        )),
    }
    Ok(())
}

/// Pick the editor command: VISUAL, then EDITOR, then a platform default.
fn resolve_editor(visual: Option<String>, editor: Option<String>) -> String {
    [visual, editor]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}
