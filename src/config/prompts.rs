//! Prompt templates for Primer.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub thumbnail: ThumbnailPrompts,
    pub quiz: QuizPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Persona and task for the summary agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful teaching assistant. You are given a topic and you need to find the information and summarize it in a way that is easy to understand for students.

Summarize the important topics and sub topics. Only use information from the original NCERT textbook for the chapter.

Wherever applicable quote chemical reactions, equations, diagrams and examples."#
                .to_string(),
            user: "{{topic}}".to_string(),
        }
    }
}

/// Template for the thumbnail image prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailPrompts {
    pub template: String,
}

impl Default for ThumbnailPrompts {
    fn default() -> Self {
        Self {
            template: r#"Generate a thumbnail image with the following:
1. A YouTube icon in the center of the image.
2. The chapter name from "{{topic}}" at the top of the image.
3. Only one diagram relevant to the following content on the lower part of the image:
{{summary}}"#
                .to_string(),
        }
    }
}

/// Prompts for multiple-choice quiz generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizPrompts {
    pub system: String,
    pub user: String,
}

impl Default for QuizPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an experienced teacher who writes multiple choice question papers.

Rules:
- Use only the study material you are given. Never invent facts, questions or answers that are not supported by it.
- Every question has exactly four options labelled A), B), C) and D).
- Do not reveal or hint at the correct answer inside the question or its options.
- Write plain text, one question or option per line."#
                .to_string(),
            user: r#"Create exactly {{count}} multiple choice questions from the study material below.

Number the questions 1 to {{count}}. After all {{count}} questions, add a section titled "Answer Key" that lists, for every question number, the correct option letter followed by a one-sentence explanation.

Study material:
{{source_text}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let thumbnail_path = custom_path.join("thumbnail.toml");
            if thumbnail_path.exists() {
                let content = std::fs::read_to_string(&thumbnail_path)?;
                prompts.thumbnail = toml::from_str(&content)?;
            }

            let quiz_path = custom_path.join("quiz.toml");
            if quiz_path.exists() {
                let content = std::fs::read_to_string(&quiz_path)?;
                prompts.quiz = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are replaced in one pass over the template, so values are
    /// inserted verbatim. Unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

        re.replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.summary.system.contains("teaching assistant"));
        assert!(prompts.quiz.user.contains("{{count}}"));
        assert!(prompts.thumbnail.template.contains("{{summary}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_values_are_inserted_verbatim() {
        let mut vars = HashMap::new();
        vars.insert("count".to_string(), "50".to_string());
        vars.insert(
            "source_text".to_string(),
            "Balance {{count}} atoms in {{topic}}.".to_string(),
        );

        for _ in 0..50 {
            let result = Prompts::render("{{count}} items from: {{source_text}}", &vars);
            assert_eq!(result, "50 items from: Balance {{count}} atoms in {{topic}}.");
        }
    }

    #[test]
    fn test_unknown_placeholder_untouched() {
        let result = Prompts::render("Hello {{missing}}", &HashMap::new());
        assert_eq!(result, "Hello {{missing}}");
    }

    #[test]
    fn test_call_variables_override_custom() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("board".to_string(), "CBSE".to_string());
        prompts
            .variables
            .insert("topic".to_string(), "from config".to_string());

        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), "Light".to_string());

        let rendered = prompts.render_with_custom("{{board}}: {{topic}}", &vars);
        assert_eq!(rendered, "CBSE: Light");
    }

    #[test]
    fn test_load_custom_quiz_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("quiz.toml"),
            "system = \"Be strict.\"\nuser = \"Write {{count}} questions.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.quiz.system, "Be strict.");
        assert!(prompts.summary.system.contains("teaching assistant"));
    }
}
