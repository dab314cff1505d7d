//! CLI output formatting utilities.

use crate::orchestrator::{Stage, StageFailure, StageStatus};
use crate::video_search::VideoRecord;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a stage header line with its status.
    pub fn stage(stage: Stage, status: StageStatus, elapsed_ms: u64) {
        let badge = match status {
            StageStatus::Succeeded => style("ok").green().bold(),
            StageStatus::Failed => style("failed").red().bold(),
            StageStatus::Skipped => style("skipped").dim(),
            StageStatus::Pending | StageStatus::Running => style("incomplete").yellow(),
        };
        let title = capitalize(&stage.to_string());
        if status == StageStatus::Skipped {
            println!("\n{} [{}]", style(title).bold().underlined(), badge);
        } else {
            println!(
                "\n{} [{}] {}",
                style(title).bold().underlined(),
                badge,
                style(format!("{:.1}s", elapsed_ms as f64 / 1000.0)).dim()
            );
        }
    }

    /// Print a stage failure.
    pub fn failure(failure: &StageFailure) {
        println!(
            "  {} {} ({})",
            style("x").red(),
            failure.message,
            style(failure.category).dim()
        );
    }

    /// Print one video search result.
    pub fn video(index: usize, video: &VideoRecord) {
        println!(
            "  {}. {} {}",
            index,
            style(&video.title).bold(),
            style(format!("[{}]", video.duration)).cyan()
        );
        println!(
            "     {} | {} | {}",
            video.channel, video.views, video.published
        );
        if !video.link.is_empty() {
            println!("     {}", style(&video.link).dim());
        }
    }

    /// Print a block of text, indented.
    pub fn text_block(text: &str, max_chars: usize) {
        for line in content_preview(text, max_chars).lines() {
            println!("  {}", line);
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Shorten content for display, on character boundaries.
fn content_preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((cut, _)) => format!("{}...", &content[..cut]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("video search"), "Video search");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("éééé", 2), "éé...");
    }
}
