//! YouTube search through yt-dlp.

use super::{format_duration, format_views, VideoRecord, VideoSearch, UNKNOWN};
use crate::config::VideoSearchSettings;
use crate::error::{PrimerError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// YouTube search backed by yt-dlp's `ytsearch` extractor.
pub struct YoutubeSearch {
    ytdlp_path: String,
    timeout: Duration,
}

impl YoutubeSearch {
    pub fn new() -> Self {
        Self::with_config(&VideoSearchSettings::default())
    }

    /// Create a search backend with a custom binary and timeout.
    pub fn with_config(settings: &VideoSearchSettings) -> Self {
        Self {
            ytdlp_path: settings.ytdlp_path.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// Run yt-dlp and return its stdout.
    async fn run_ytdlp(&self, query: &str, limit: usize) -> Result<String> {
        let search = format!("ytsearch{}:{}", limit, query);

        let child = tokio::process::Command::new(&self.ytdlp_path)
            .args([
                "--dump-json",
                "--flat-playlist",
                "--no-download",
                "--no-warnings",
                &search,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PrimerError::ToolNotFound(self.ytdlp_path.clone())
                } else {
                    PrimerError::ProviderCommunication(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                PrimerError::ProviderCommunication(format!(
                    "yt-dlp search timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| PrimerError::ProviderCommunication(format!("yt-dlp failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrimerError::ProviderCommunication(format!(
                "yt-dlp search failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for YoutubeSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoSearch for YoutubeSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PrimerError::InvalidInput("Search query must not be empty".to_string()));
        }
        if limit == 0 {
            return Err(PrimerError::InvalidInput(
                "Search limit must be positive".to_string(),
            ));
        }

        let stdout = self.run_ytdlp(query, limit).await?;
        let mut records = parse_search_output(&stdout);
        records.truncate(limit);

        info!("Found {} videos for '{}'", records.len(), query);
        Ok(records)
    }
}

/// Parse yt-dlp `--dump-json` output (one JSON object per line).
///
/// Lines that are not JSON objects are skipped.
pub fn parse_search_output(stdout: &str) -> Vec<VideoRecord> {
    let mut records = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(json) if json.is_object() => records.push(record_from_json(&json)),
            Ok(_) => warn!("Skipping non-object search result line"),
            Err(e) => warn!("Skipping unparseable search result line: {}", e),
        }
    }

    debug!("Parsed {} search results", records.len());
    records
}

/// Map one loosely-typed search entry onto a `VideoRecord`.
fn record_from_json(json: &Value) -> VideoRecord {
    let defaults = VideoRecord::default();

    let title = non_empty_str(&json["title"]).unwrap_or(defaults.title);

    let link = non_empty_str(&json["webpage_url"])
        .or_else(|| non_empty_str(&json["url"]).filter(|u| u.starts_with("http")))
        .or_else(|| {
            non_empty_str(&json["id"]).map(|id| format!("https://www.youtube.com/watch?v={}", id))
        })
        .unwrap_or(defaults.link);

    let duration = as_u64(&json["duration"])
        .map(format_duration)
        .or_else(|| non_empty_str(&json["duration_string"]))
        .unwrap_or(defaults.duration);

    let channel = non_empty_str(&json["channel"])
        .or_else(|| non_empty_str(&json["uploader"]))
        .unwrap_or(defaults.channel);

    let views = as_u64(&json["view_count"])
        .map(format_views)
        .unwrap_or(defaults.views);

    let published = non_empty_str(&json["upload_date"])
        .and_then(|d| chrono::NaiveDate::parse_from_str(&d, "%Y%m%d").ok())
        .or_else(|| {
            as_u64(&json["timestamp"])
                .and_then(|ts| chrono::DateTime::from_timestamp(ts as i64, 0))
                .map(|dt| dt.date_naive())
        })
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or(defaults.published);

    let description = non_empty_str(&json["description"]).unwrap_or(defaults.description);

    let thumbnail = non_empty_str(&json["thumbnail"])
        .or_else(|| {
            json["thumbnails"]
                .as_array()
                .and_then(|thumbs| thumbs.iter().rev().find_map(|t| non_empty_str(&t["url"])))
        })
        .unwrap_or(defaults.thumbnail);

    VideoRecord {
        title,
        link,
        duration,
        channel,
        views,
        published,
        description,
        thumbnail,
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != UNKNOWN)
        .map(|s| s.to_string())
}

/// Accept non-negative numbers as well as numeric strings.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_entry() {
        let line = r#"{"id":"abc123def45","title":"Chemical Reactions Class 10","url":"https://www.youtube.com/watch?v=abc123def45","duration":754.0,"channel":"Science Hub","view_count":1230,"upload_date":"20230115","description":"Full chapter","thumbnails":[{"url":"https://i.ytimg.com/low.jpg"},{"url":"https://i.ytimg.com/high.jpg"}]}"#;
        let records = parse_search_output(line);

        assert_eq!(records.len(), 1);
        let video = &records[0];
        assert_eq!(video.title, "Chemical Reactions Class 10");
        assert_eq!(video.link, "https://www.youtube.com/watch?v=abc123def45");
        assert_eq!(video.duration, "12:34");
        assert_eq!(video.channel, "Science Hub");
        assert_eq!(video.views, "1.2K views");
        assert_eq!(video.published, "2023-01-15");
        assert_eq!(video.thumbnail, "https://i.ytimg.com/high.jpg");
    }

    #[test]
    fn test_missing_fields_default() {
        let records = parse_search_output(r#"{"id":"abc123def45"}"#);

        assert_eq!(records.len(), 1);
        let video = &records[0];
        assert_eq!(video.title, "No title");
        assert_eq!(video.link, "https://www.youtube.com/watch?v=abc123def45");
        assert_eq!(video.duration, UNKNOWN);
        assert_eq!(video.channel, "Unknown channel");
        assert_eq!(video.views, "Unknown views");
        assert_eq!(video.published, UNKNOWN);
        assert_eq!(video.thumbnail, "");
    }

    #[test]
    fn test_unexpected_types_do_not_fail_record() {
        let line = r#"{"title":42,"duration":"95","view_count":null,"uploader":"Teacher","thumbnails":"none","timestamp":1700000000}"#;
        let records = parse_search_output(line);

        assert_eq!(records.len(), 1);
        let video = &records[0];
        assert_eq!(video.title, "No title");
        assert_eq!(video.duration, "1:35");
        assert_eq!(video.views, "Unknown views");
        assert_eq!(video.channel, "Teacher");
        assert_eq!(video.published, "2023-11-14");
        assert_eq!(video.link, "");
    }

    #[test]
    fn test_skips_garbage_and_keeps_order() {
        let output = "{\"title\":\"First\"}\nnot json\n[1,2]\n\n{\"title\":\"Second\"}\n";
        let records = parse_search_output(output);
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_empty_output_is_empty() {
        assert!(parse_search_output("").is_empty());
    }

    #[tokio::test]
    async fn test_rejects_empty_query() {
        let search = YoutubeSearch::new();
        let err = search.search("   ", 5).await.unwrap_err();
        assert!(matches!(err, PrimerError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let search = YoutubeSearch::with_config(&VideoSearchSettings {
            ytdlp_path: "primer-no-such-binary".to_string(),
            ..Default::default()
        });
        let err = search.search("photosynthesis", 5).await.unwrap_err();
        assert!(matches!(err, PrimerError::ToolNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_backend_is_communication_error() {
        // `false` exits non-zero without output.
        let search = YoutubeSearch::with_config(&VideoSearchSettings {
            ytdlp_path: "false".to_string(),
            ..Default::default()
        });
        let err = search.search("photosynthesis", 5).await.unwrap_err();
        assert!(matches!(err, PrimerError::ProviderCommunication(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_matches_is_empty() {
        // `true` exits zero and prints nothing, like a search with no hits.
        let search = YoutubeSearch::with_config(&VideoSearchSettings {
            ytdlp_path: "true".to_string(),
            ..Default::default()
        });
        let records = search.search("zzzz no such topic", 5).await.unwrap();
        assert!(records.is_empty());
    }
}
