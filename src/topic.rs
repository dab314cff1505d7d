//! Topic selection and normalization.
//!
//! Every stage works from one canonical query string, e.g.
//! `NCERT Class 10 Science Chapter 1`.

use crate::error::{PrimerError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Curriculum subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Science,
    Maths,
    Sociology,
    History,
    Geography,
    PoliticalScience,
    Economics,
}

impl Subject {
    /// All supported subjects, in menu order.
    pub const ALL: [Subject; 7] = [
        Subject::Science,
        Subject::Maths,
        Subject::Sociology,
        Subject::History,
        Subject::Geography,
        Subject::PoliticalScience,
        Subject::Economics,
    ];
}

impl std::str::FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "science" => Ok(Subject::Science),
            "maths" | "math" | "mathematics" => Ok(Subject::Maths),
            "sociology" => Ok(Subject::Sociology),
            "history" => Ok(Subject::History),
            "geography" => Ok(Subject::Geography),
            "politicalscience" | "polsci" | "civics" => Ok(Subject::PoliticalScience),
            "economics" | "eco" => Ok(Subject::Economics),
            _ => {
                let known: Vec<String> = Subject::ALL
                    .iter()
                    .map(|subject| subject.to_string())
                    .collect();
                Err(format!(
                    "Unknown subject '{}'. Expected one of: {}",
                    s.trim(),
                    known.join(", ")
                ))
            }
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Subject::Science => "Science",
            Subject::Maths => "Maths",
            Subject::Sociology => "Sociology",
            Subject::History => "History",
            Subject::Geography => "Geography",
            Subject::PoliticalScience => "Political Science",
            Subject::Economics => "Economics",
        };
        write!(f, "{}", name)
    }
}

/// What the user asked resources for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// An NCERT textbook chapter.
    Chapter {
        class_level: u8,
        subject: Subject,
        chapter: u32,
    },
    /// Any other topic, already normalized.
    FreeForm(String),
}

impl Topic {
    /// Build a chapter topic, validating its selectors.
    pub fn chapter(class_level: u8, subject: Subject, chapter: u32) -> Result<Self> {
        if !(1..=12).contains(&class_level) {
            return Err(PrimerError::InvalidInput(format!(
                "Class must be between 1 and 12, got {}",
                class_level
            )));
        }
        if chapter == 0 {
            return Err(PrimerError::InvalidInput(
                "Chapter numbers start at 1".to_string(),
            ));
        }
        Ok(Topic::Chapter {
            class_level,
            subject,
            chapter,
        })
    }

    /// Build a free-form topic. Whitespace is collapsed; empty input is rejected.
    pub fn free_form(input: &str) -> Result<Self> {
        let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(PrimerError::InvalidInput("Topic must not be empty".to_string()));
        }
        Ok(Topic::FreeForm(normalized))
    }

    /// The canonical query string shared by every stage.
    pub fn canonical(&self) -> String {
        match self {
            Topic::Chapter {
                class_level,
                subject,
                chapter,
            } => format!("NCERT Class {} {} Chapter {}", class_level, subject, chapter),
            Topic::FreeForm(text) => text.clone(),
        }
    }

    /// Filesystem-safe name derived from the canonical string.
    pub fn slug(&self) -> String {
        static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
        let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

        let lowered = self.canonical().to_lowercase();
        let slug = re.replace_all(&lowered, "_");
        let slug = slug.trim_matches('_');
        if slug.is_empty() {
            "topic".to_string()
        } else {
            slug.to_string()
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}
