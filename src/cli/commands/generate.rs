//! Generate command implementation.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::error::{PrimerError, Result as PrimerResult};
use crate::orchestrator::{Orchestrator, PipelineRun, Stage, StageOutcome, StageStatus};
use crate::topic::{Subject, Topic};
use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Arguments of `primer generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub topic: Option<String>,
    pub class: Option<u8>,
    pub subject: Option<String>,
    pub chapter: Option<u32>,
    pub output_dir: Option<String>,
    pub json: bool,
    pub no_video: bool,
    pub no_thumbnail: bool,
    pub no_quiz: bool,
    pub questions: Option<usize>,
}

/// Run the generate command.
pub async fn run_generate(args: GenerateArgs, mut settings: Settings) -> Result<()> {
    let topic = resolve_topic(&args)?;
    apply_overrides(&args, &mut settings)?;

    let credentials = Credentials::resolve(&settings.credentials);
    for warning in preflight::warnings(&settings, &credentials) {
        Output::warning(&warning);
    }

    let output_dir = settings.output_dir();
    let orchestrator = Orchestrator::with_credentials(settings, &credentials)?;

    Output::info(&format!("Generating resources for: {}", topic.canonical()));
    let spinner = Output::spinner("Starting...");
    let observer = {
        let spinner = spinner.clone();
        move |stage: Stage, status: StageStatus| {
            if status == StageStatus::Running {
                spinner.set_message(format!("Running {}...", stage));
            }
        }
    };
    let run = orchestrator
        .run_with_progress(&topic, Some(&observer))
        .await;
    spinner.finish_and_clear();

    print_run(&run);

    let slug = topic.slug();
    if let Some(quiz) = run.quiz.value() {
        let path = write_atomic(&output_dir, &quiz_file_name(&slug), &quiz.rendered_bytes)?;
        Output::success(&format!("Quiz PDF written to {}", path.display()));
    }

    if args.json {
        let report = serde_json::to_vec_pretty(&run)?;
        let path = write_atomic(&output_dir, &format!("{}_run.json", slug), &report)?;
        Output::success(&format!("Run report written to {}", path.display()));
    }

    match run.failed_stages() {
        0 => Output::success("All stages completed."),
        n => Output::warning(&format!(
            "{} stage(s) failed. Run 'primer doctor' to check your setup.",
            n
        )),
    }

    Ok(())
}

/// Build the topic from either the chapter selectors or the free-form text.
fn resolve_topic(args: &GenerateArgs) -> PrimerResult<Topic> {
    match (&args.topic, args.class, &args.subject, args.chapter) {
        (None, Some(class), Some(subject), Some(chapter)) => {
            let subject: Subject = subject.parse().map_err(PrimerError::InvalidInput)?;
            Topic::chapter(class, subject, chapter)
        }
        (Some(text), None, None, None) => Topic::free_form(text),
        (None, None, None, None) => Err(PrimerError::InvalidInput(
            "Give a topic, or --class, --subject and --chapter".to_string(),
        )),
        _ => Err(PrimerError::InvalidInput(
            "Use either a free-form topic or --class/--subject/--chapter, not both".to_string(),
        )),
    }
}

fn apply_overrides(args: &GenerateArgs, settings: &mut Settings) -> PrimerResult<()> {
    if let Some(dir) = &args.output_dir {
        settings.general.output_dir = dir.clone();
    }
    if let Some(count) = args.questions {
        if count == 0 {
            return Err(PrimerError::InvalidInput(
                "--questions must be at least 1".to_string(),
            ));
        }
        settings.quiz.question_count = count;
    }
    if args.no_video {
        settings.pipeline.enable_video_search = false;
    }
    if args.no_thumbnail {
        settings.pipeline.enable_thumbnail = false;
    }
    if args.no_quiz {
        settings.pipeline.enable_quiz = false;
    }
    Ok(())
}

/// File name of the quiz PDF for a topic slug.
pub fn quiz_file_name(slug: &str) -> String {
    format!("{}_mcqs.pdf", slug)
}

/// Write bytes to `dir/name` through a temporary file in the same directory.
fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> PrimerResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| e.error)?;

    Ok(path)
}

fn print_run(run: &PipelineRun) {
    Output::header(&run.topic);
    if run.used_fallback_text {
        Output::warning("Summary failed; other stages used the topic text instead.");
    }

    for report in &run.reports {
        Output::stage(report.stage, report.status, report.elapsed_ms);
        if let Some(failure) = &report.error {
            Output::failure(failure);
            continue;
        }

        match report.stage {
            Stage::Summary => {
                if let StageOutcome::Succeeded(summary) = &run.summary {
                    Output::text_block(&summary.text, 1200);
                    if !summary.metadata.model.is_empty() {
                        Output::kv("Model", &summary.metadata.model);
                    }
                }
            }
            Stage::Narration => {
                if let StageOutcome::Succeeded(audio) = &run.narration {
                    Output::kv("Audio", &audio.url);
                    if run.narration_truncated {
                        Output::kv("Note", "summary was shortened for narration");
                    }
                }
            }
            Stage::VideoSearch => {
                if let StageOutcome::Succeeded(videos) = &run.videos {
                    if videos.is_empty() {
                        Output::kv("Results", "no videos found");
                    }
                    for (i, video) in videos.iter().enumerate() {
                        Output::video(i + 1, video);
                    }
                }
            }
            Stage::Thumbnail => {
                if let StageOutcome::Succeeded(image) = &run.thumbnail {
                    Output::kv("Image", &image.url);
                }
            }
            Stage::Quiz => {
                if let StageOutcome::Succeeded(quiz) = &run.quiz {
                    Output::kv("Questions requested", &quiz.requested_items.to_string());
                    Output::kv("Pages", &quiz.page_count.to_string());
                    if quiz.transliterated_lines > 0 {
                        Output::kv(
                            "Transliterated lines",
                            &quiz.transliterated_lines.to_string(),
                        );
                    }
                }
            }
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_chapter_topic() {
        let args = GenerateArgs {
            class: Some(10),
            subject: Some("science".to_string()),
            chapter: Some(1),
            ..Default::default()
        };
        let topic = resolve_topic(&args).unwrap();
        assert_eq!(topic.canonical(), "NCERT Class 10 Science Chapter 1");
    }

    #[test]
    fn test_resolve_free_form_topic() {
        let args = GenerateArgs {
            topic: Some("  photosynthesis   in plants ".to_string()),
            ..Default::default()
        };
        let topic = resolve_topic(&args).unwrap();
        assert_eq!(topic.canonical(), "photosynthesis in plants");
    }

    #[test]
    fn test_resolve_requires_some_topic() {
        assert!(matches!(
            resolve_topic(&GenerateArgs::default()),
            Err(PrimerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        let args = GenerateArgs {
            output_dir: Some("/tmp/out".to_string()),
            questions: Some(20),
            no_video: true,
            no_quiz: true,
            ..Default::default()
        };
        apply_overrides(&args, &mut settings).unwrap();

        assert_eq!(settings.general.output_dir, "/tmp/out");
        assert_eq!(settings.quiz.question_count, 20);
        assert!(!settings.pipeline.enable_video_search);
        assert!(settings.pipeline.enable_thumbnail);
        assert!(!settings.pipeline.enable_quiz);

        let zero = GenerateArgs {
            questions: Some(0),
            ..Default::default()
        };
        assert!(apply_overrides(&zero, &mut settings).is_err());
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let name = quiz_file_name("ncert_class_10_science_chapter_1");
        assert_eq!(name, "ncert_class_10_science_chapter_1_mcqs.pdf");

        tokio_test::assert_ok!(write_atomic(dir.path(), &name, b"first"));
        let path = tokio_test::assert_ok!(write_atomic(dir.path(), &name, b"%PDF second"));

        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
