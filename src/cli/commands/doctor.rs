//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{mask_secret, Credentials, Settings};
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
///
/// Missing pieces only disable individual stages, so problems are warnings
/// unless nothing at all could run.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Primer Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let tool = check_tool(&settings.video_search.ytdlp_path, install_hint_ytdlp());
    tool.print();
    checks.push(tool);

    println!();

    println!("{}", style("Credentials").bold());
    let credentials = Credentials::resolve(&settings.credentials);
    for check in check_credentials(&credentials) {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    let output_check = check_output_dir(&settings.output_dir());
    output_check.print();
    checks.push(output_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Primer.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "Checks passed with {} warning(s). Affected stages will fail.",
            warnings
        ));
    } else {
        Output::success("All checks passed! Primer is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect::<String>();
            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::warning(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(name, "not found (video search will fail)", hint)
        }
        Err(e) => CheckResult::warning(name, &format!("error: {}", e), hint),
    }
}

/// Check both provider credentials. Missing both is an error.
fn check_credentials(credentials: &Credentials) -> Vec<CheckResult> {
    let openai = match &credentials.openai_api_key {
        Some(key) => CheckResult::ok(
            Credentials::OPENAI_ENV,
            &format!("configured ({})", mask_secret(key)),
        ),
        None => CheckResult::warning(
            Credentials::OPENAI_ENV,
            "not set (summary, thumbnail and quiz will fail)",
            "Set [credentials] openai_api_key or export OPENAI_API_KEY='sk-...'",
        ),
    };
    let fal = match &credentials.fal_key {
        Some(key) => CheckResult::ok(
            Credentials::FAL_ENV,
            &format!("configured ({})", mask_secret(key)),
        ),
        None => CheckResult::warning(
            Credentials::FAL_ENV,
            "not set (narration will fail)",
            "Set [credentials] fal_key or export FAL_KEY='...'",
        ),
    };

    if credentials.openai_api_key.is_none() && credentials.fal_key.is_none() {
        return vec![
            CheckResult::error(
                "Credentials",
                "no provider credentials found",
                "Set OPENAI_API_KEY and FAL_KEY",
            ),
            openai,
            fal,
        ];
    }
    vec![openai, fal]
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: primer config edit",
        )
    }
}

fn check_output_dir(dir: &Path) -> CheckResult {
    if dir.is_dir() {
        CheckResult::ok("Output directory", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Output directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first run",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
