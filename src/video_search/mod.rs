//! Competitor video search.
//!
//! Provides a trait-based interface for video search backends and the uniform
//! record shape every backend normalizes into.

mod youtube;

pub use youtube::{parse_search_output, YoutubeSearch};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sentinel for fields the provider did not report.
pub const UNKNOWN: &str = "Unknown";

/// One search result, with every field defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub title: String,
    pub link: String,
    /// Display duration, e.g. `12:34`.
    pub duration: String,
    pub channel: String,
    /// Display view count, e.g. `1.2M views`.
    pub views: String,
    /// Display publication date.
    pub published: String,
    pub description: String,
    pub thumbnail: String,
}

impl Default for VideoRecord {
    fn default() -> Self {
        Self {
            title: "No title".to_string(),
            link: String::new(),
            duration: UNKNOWN.to_string(),
            channel: "Unknown channel".to_string(),
            views: "Unknown views".to_string(),
            published: UNKNOWN.to_string(),
            description: String::new(),
            thumbnail: String::new(),
        }
    }
}

/// Trait for video search providers.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Search for up to `limit` videos, in provider order.
    ///
    /// No matches is `Ok(vec![])`, not an error.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoRecord>>;
}

/// Format seconds as M:SS or H:MM:SS.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format a view count the way YouTube abbreviates it.
pub fn format_views(count: u64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

    let n = count as f64;
    let Some(mut unit) = UNITS.iter().position(|(scale, _)| n >= *scale) else {
        return match count {
            1 => "1 view".to_string(),
            _ => format!("{} views", count),
        };
    };

    // 999_950 would round to "1000K"; carry into the next unit instead.
    let mut value = (n / UNITS[unit].0 * 10.0).round() / 10.0;
    if value >= 1000.0 && unit > 0 {
        unit -= 1;
        value = (n / UNITS[unit].0 * 10.0).round() / 10.0;
    }

    let rounded = format!("{:.1}", value);
    let rounded = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{}{} views", rounded, UNITS[unit].1)
}
