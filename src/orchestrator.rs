//! Pipeline orchestrator for Primer.
//!
//! Runs the five resource stages for one topic. Every stage is isolated: a
//! failure is recorded in the run and the remaining stages still execute.

use crate::agent::{SummaryAgent, SummaryResult, Summarizer};
use crate::config::{Credentials, Prompts, Settings};
use crate::error::{ErrorCategory, PrimerError, Result};
use crate::narration::{AudioArtifact, FalNarrator, Narrator, VoiceId};
use crate::quiz::{OpenAIQuizGenerator, QuizDocument, QuizGenerator};
use crate::thumbnail::{build_thumbnail_prompt, DalleThumbnailer, ImageArtifact, ThumbnailGenerator};
use crate::topic::Topic;
use crate::truncate::truncate;
use crate::video_search::{VideoRecord, VideoSearch, YoutubeSearch};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// One slot of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Summary,
    Narration,
    VideoSearch,
    Thumbnail,
    Quiz,
}

impl Stage {
    /// Presentation order.
    pub const ALL: [Stage; 5] = [
        Stage::Summary,
        Stage::Narration,
        Stage::VideoSearch,
        Stage::Thumbnail,
        Stage::Quiz,
    ];
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Summary => "summary",
            Stage::Narration => "narration",
            Stage::VideoSearch => "video search",
            Stage::Thumbnail => "thumbnail",
            Stage::Quiz => "quiz",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

/// Recorded reason a stage failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub category: ErrorCategory,
    pub message: String,
}

impl From<&PrimerError> for StageFailure {
    fn from(err: &PrimerError) -> Self {
        Self {
            category: err.category(),
            message: err.to_string(),
        }
    }
}

/// Terminal state of one stage.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Succeeded(T),
    Failed(StageFailure),
    Skipped,
}

impl<T> StageOutcome<T> {
    pub fn status(&self) -> StageStatus {
        match self {
            StageOutcome::Succeeded(_) => StageStatus::Succeeded,
            StageOutcome::Failed(_) => StageStatus::Failed,
            StageOutcome::Skipped => StageStatus::Skipped,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            StageOutcome::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            StageOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Timing and status line for one stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    pub elapsed_ms: u64,
    pub error: Option<StageFailure>,
}

/// Everything produced for one topic.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub id: Uuid,
    pub topic: String,
    pub started_at: DateTime<Utc>,
    pub summary: StageOutcome<SummaryResult>,
    pub narration: StageOutcome<AudioArtifact>,
    pub videos: StageOutcome<Vec<VideoRecord>>,
    pub thumbnail: StageOutcome<ImageArtifact>,
    pub quiz: StageOutcome<QuizDocument>,
    /// Downstream stages worked from the topic string because the summary failed.
    pub used_fallback_text: bool,
    pub narration_truncated: bool,
    /// One report per stage, in presentation order.
    pub reports: Vec<StageReport>,
}

impl PipelineRun {
    /// Number of stages that failed.
    pub fn failed_stages(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.status == StageStatus::Failed)
            .count()
    }
}

/// Observer notified on every stage transition.
pub type ProgressFn<'a> = dyn Fn(Stage, StageStatus) + Send + Sync + 'a;

/// The main orchestrator for the Primer pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    summarizer: Arc<dyn Summarizer>,
    video_search: Arc<dyn VideoSearch>,
    narrator: Arc<dyn Narrator>,
    thumbnailer: Arc<dyn ThumbnailGenerator>,
    quiz: Arc<dyn QuizGenerator>,
}

impl Orchestrator {
    /// Create an orchestrator, resolving credentials from settings and the environment.
    pub fn new(settings: Settings) -> Result<Self> {
        let credentials = Credentials::resolve(&settings.credentials);
        Self::with_credentials(settings, &credentials)
    }

    /// Create an orchestrator with explicit credentials.
    pub fn with_credentials(settings: Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        for name in credentials.missing() {
            warn!("{} is not set; stages that need it will fail", name);
        }

        let summarizer = Arc::new(SummaryAgent::from_settings(
            &settings,
            credentials,
            prompts.clone(),
        )?);
        let video_search = Arc::new(YoutubeSearch::with_config(&settings.video_search));
        let narrator = Arc::new(FalNarrator::new(
            &settings.narration,
            credentials.fal_key.as_deref(),
        )?);
        let thumbnailer = Arc::new(DalleThumbnailer::from_settings(&settings, credentials)?);
        let quiz = Arc::new(OpenAIQuizGenerator::from_settings(
            &settings,
            credentials,
            prompts.clone(),
        )?);

        Ok(Self::with_components(
            settings,
            prompts,
            summarizer,
            video_search,
            narrator,
            thumbnailer,
            quiz,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        summarizer: Arc<dyn Summarizer>,
        video_search: Arc<dyn VideoSearch>,
        narrator: Arc<dyn Narrator>,
        thumbnailer: Arc<dyn ThumbnailGenerator>,
        quiz: Arc<dyn QuizGenerator>,
    ) -> Self {
        Self {
            settings,
            prompts,
            summarizer,
            video_search,
            narrator,
            thumbnailer,
            quiz,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run every stage for a topic.
    pub async fn run(&self, topic: &Topic) -> PipelineRun {
        self.run_with_progress(topic, None).await
    }

    /// Run every stage for a topic, reporting transitions to `progress`.
    #[instrument(skip(self, topic, progress), fields(topic = %topic.canonical()))]
    pub async fn run_with_progress(
        &self,
        topic: &Topic,
        progress: Option<&ProgressFn<'_>>,
    ) -> PipelineRun {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let query = topic.canonical();
        let pipeline = &self.settings.pipeline;

        info!("Starting run {} for '{}'", id, query);
        for stage in Stage::ALL {
            notify(progress, stage, StageStatus::Pending);
        }

        // Video search needs only the topic.
        let ((summary, summary_report), (videos, videos_report)) = tokio::join!(
            self.run_stage(Stage::Summary, progress, self.summarizer.summarize(topic)),
            async {
                if pipeline.enable_video_search {
                    self.run_stage(
                        Stage::VideoSearch,
                        progress,
                        self.video_search
                            .search(&query, self.settings.video_search.limit),
                    )
                    .await
                } else {
                    skip(Stage::VideoSearch, progress)
                }
            }
        );

        let (source_text, used_fallback_text) = match summary.value() {
            Some(result) => (result.text.as_str(), false),
            None => {
                warn!("Summary unavailable; later stages use the topic text");
                (query.as_str(), true)
            }
        };

        let voice = VoiceId::new(self.settings.narration.voice.as_str());
        let mut narration_truncated = false;
        let (narration, narration_report) = self
            .run_stage(Stage::Narration, progress, async {
                let view = truncate(source_text, self.settings.narration.max_chars)?;
                narration_truncated = view.was_truncated;
                self.narrator.synthesize(&view.text, &voice).await
            })
            .await;

        let (thumbnail, thumbnail_report) = if pipeline.enable_thumbnail {
            let prompt = build_thumbnail_prompt(&self.prompts, &query, source_text);
            self.run_stage(Stage::Thumbnail, progress, self.thumbnailer.generate(&prompt))
                .await
        } else {
            skip(Stage::Thumbnail, progress)
        };

        let (quiz, quiz_report) = if pipeline.enable_quiz {
            self.run_stage(
                Stage::Quiz,
                progress,
                self.quiz
                    .generate_quiz(source_text, self.settings.quiz.question_count),
            )
            .await
        } else {
            skip(Stage::Quiz, progress)
        };

        let run = PipelineRun {
            id,
            topic: query,
            started_at,
            summary,
            narration,
            videos,
            thumbnail,
            quiz,
            used_fallback_text,
            narration_truncated,
            reports: vec![
                summary_report,
                narration_report,
                videos_report,
                thumbnail_report,
                quiz_report,
            ],
        };

        info!(
            "Run {} finished with {} failed stage(s)",
            run.id,
            run.failed_stages()
        );
        run
    }

    /// Drive one stage to a terminal state under the stage timeout.
    async fn run_stage<T, F>(
        &self,
        stage: Stage,
        progress: Option<&ProgressFn<'_>>,
        work: F,
    ) -> (StageOutcome<T>, StageReport)
    where
        F: Future<Output = Result<T>>,
    {
        notify(progress, stage, StageStatus::Running);
        let limit = Duration::from_secs(self.settings.pipeline.stage_timeout_secs);
        let started = Instant::now();

        let result = match tokio::time::timeout(limit, work).await {
            Ok(result) => result,
            Err(_) => Err(PrimerError::ProviderCommunication(format!(
                "{} stage timed out after {}s",
                stage,
                limit.as_secs()
            ))),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(value) => {
                info!("{} stage succeeded in {} ms", stage, elapsed_ms);
                StageOutcome::Succeeded(value)
            }
            Err(e) => {
                warn!("{} stage failed: {}", stage, e);
                StageOutcome::Failed(StageFailure::from(&e))
            }
        };

        let report = StageReport {
            stage,
            status: outcome.status(),
            elapsed_ms,
            error: outcome.failure().cloned(),
        };
        notify(progress, stage, report.status);
        (outcome, report)
    }
}

fn notify(progress: Option<&ProgressFn<'_>>, stage: Stage, status: StageStatus) {
    if let Some(observer) = progress {
        observer(stage, status);
    }
}

fn skip<T>(stage: Stage, progress: Option<&ProgressFn<'_>>) -> (StageOutcome<T>, StageReport) {
    info!("{} stage disabled", stage);
    notify(progress, stage, StageStatus::Skipped);
    (
        StageOutcome::Skipped,
        StageReport {
            stage,
            status: StageStatus::Skipped,
            elapsed_ms: 0,
            error: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::SummaryMetadata;
    use crate::quiz::build_quiz_prompt;
    use crate::topic::Subject;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeSummarizer {
        text: Option<String>,
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, _topic: &Topic) -> Result<SummaryResult> {
            match &self.text {
                Some(text) => Ok(SummaryResult {
                    text: text.clone(),
                    metadata: SummaryMetadata::default(),
                }),
                None => Err(PrimerError::Agent("model returned nothing".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct FakeSearch {
        queries: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl VideoSearch for FakeSearch {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoRecord>> {
            self.queries.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(vec![VideoRecord::default(); limit.min(2)])
        }
    }

    #[derive(Default)]
    struct FakeNarrator {
        received: Mutex<Option<String>>,
    }

    #[async_trait]
    impl Narrator for FakeNarrator {
        async fn synthesize(&self, text: &str, _voice: &VoiceId) -> Result<AudioArtifact> {
            *self.received.lock().unwrap() = Some(text.to_string());
            Ok(AudioArtifact {
                url: "https://cdn.example/audio.mp3".to_string(),
                content_type: None,
            })
        }
    }

    #[derive(Default)]
    struct FakeThumbnailer {
        prompt: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ThumbnailGenerator for FakeThumbnailer {
        async fn generate(&self, prompt: &str) -> Result<ImageArtifact> {
            *self.prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(ImageArtifact {
                url: "https://images.example/thumb.png".to_string(),
                revised_prompt: None,
            })
        }
    }

    #[derive(Default)]
    struct FakeQuiz {
        received: Mutex<Option<(String, usize)>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuizGenerator for FakeQuiz {
        async fn generate_quiz(&self, source_text: &str, count: usize) -> Result<QuizDocument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.received.lock().unwrap() = Some((source_text.to_string(), count));
            Ok(QuizDocument {
                raw_text: "1. Question".to_string(),
                rendered_bytes: b"%PDF-1.3".to_vec(),
                requested_items: count,
                page_count: 1,
                transliterated_lines: 0,
            })
        }
    }

    struct Fakes {
        search: Arc<FakeSearch>,
        narrator: Arc<FakeNarrator>,
        thumbnailer: Arc<FakeThumbnailer>,
        quiz: Arc<FakeQuiz>,
    }

    impl Fakes {
        fn new() -> Self {
            Self {
                search: Arc::new(FakeSearch::default()),
                narrator: Arc::new(FakeNarrator::default()),
                thumbnailer: Arc::new(FakeThumbnailer::default()),
                quiz: Arc::new(FakeQuiz::default()),
            }
        }

        fn orchestrator(&self, settings: Settings, summary: Option<String>) -> Orchestrator {
            Orchestrator::with_components(
                settings,
                Prompts::default(),
                Arc::new(FakeSummarizer { text: summary }),
                self.search.clone(),
                self.narrator.clone(),
                self.thumbnailer.clone(),
                self.quiz.clone(),
            )
        }
    }

    fn science_chapter_one() -> Topic {
        Topic::chapter(10, Subject::Science, 1).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_text_flow() {
        let fakes = Fakes::new();
        let summary = "a".repeat(4000);
        let orchestrator = fakes.orchestrator(Settings::default(), Some(summary.clone()));

        let run = orchestrator.run(&science_chapter_one()).await;

        assert_eq!(run.topic, "NCERT Class 10 Science Chapter 1");
        assert_eq!(run.failed_stages(), 0);
        assert!(!run.used_fallback_text);
        assert!(run.narration_truncated);

        let narrated = fakes.narrator.received.lock().unwrap().clone().unwrap();
        assert_eq!(narrated.chars().count(), 2503);
        assert!(narrated.ends_with("..."));

        let prompt = fakes.thumbnailer.prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains(&summary));
        assert!(prompt.contains("NCERT Class 10 Science Chapter 1"));

        let (quiz_source, count) = fakes.quiz.received.lock().unwrap().clone().unwrap();
        assert_eq!(quiz_source, summary);
        assert_eq!(count, 50);
        assert!(build_quiz_prompt(&Prompts::default(), &quiz_source, count).contains("exactly 50"));

        assert_eq!(
            fakes.search.queries.lock().unwrap().as_slice(),
            ["NCERT Class 10 Science Chapter 1".to_string()]
        );
        assert_eq!(run.videos.value().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_summary_failure_does_not_stop_other_stages() {
        let fakes = Fakes::new();
        let orchestrator = fakes.orchestrator(Settings::default(), None);

        let run = orchestrator.run(&science_chapter_one()).await;

        assert_eq!(run.summary.status(), StageStatus::Failed);
        assert_eq!(
            run.summary.failure().map(|f| f.category),
            Some(ErrorCategory::ProviderRejected)
        );
        assert!(run.used_fallback_text);
        assert_eq!(run.narration.status(), StageStatus::Succeeded);
        assert_eq!(run.videos.status(), StageStatus::Succeeded);
        assert_eq!(run.thumbnail.status(), StageStatus::Succeeded);
        assert_eq!(run.quiz.status(), StageStatus::Succeeded);

        let topic = "NCERT Class 10 Science Chapter 1";
        assert_eq!(
            fakes.narrator.received.lock().unwrap().as_deref(),
            Some(topic)
        );
        let (quiz_source, _) = fakes.quiz.received.lock().unwrap().clone().unwrap();
        assert_eq!(quiz_source, topic);
    }

    #[tokio::test]
    async fn test_missing_speech_key_only_fails_narration() {
        let fakes = Fakes::new();
        let settings = Settings::default();
        let narrator = Arc::new(FalNarrator::new(&settings.narration, None).unwrap());
        let orchestrator = Orchestrator::with_components(
            settings,
            Prompts::default(),
            Arc::new(FakeSummarizer {
                text: Some("Acids and bases.".to_string()),
            }),
            fakes.search.clone(),
            narrator,
            fakes.thumbnailer.clone(),
            fakes.quiz.clone(),
        );

        let run = orchestrator.run(&science_chapter_one()).await;

        assert_eq!(
            run.narration.failure().map(|f| f.category),
            Some(ErrorCategory::CredentialMissing)
        );
        assert_eq!(run.thumbnail.status(), StageStatus::Succeeded);
        assert_eq!(run.quiz.status(), StageStatus::Succeeded);
        assert_eq!(run.failed_stages(), 1);
    }

    #[tokio::test]
    async fn test_disabled_stages_are_skipped() {
        let fakes = Fakes::new();
        let mut settings = Settings::default();
        settings.pipeline.enable_video_search = false;
        settings.pipeline.enable_thumbnail = false;
        settings.pipeline.enable_quiz = false;
        let orchestrator = fakes.orchestrator(settings, Some("Notes".to_string()));

        let run = orchestrator.run(&science_chapter_one()).await;

        assert_eq!(run.videos.status(), StageStatus::Skipped);
        assert_eq!(run.thumbnail.status(), StageStatus::Skipped);
        assert_eq!(run.quiz.status(), StageStatus::Skipped);
        assert_eq!(run.narration.status(), StageStatus::Succeeded);
        assert!(fakes.search.queries.lock().unwrap().is_empty());
        assert_eq!(fakes.quiz.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stage_timeout_is_communication_failure() {
        let fakes = Fakes {
            search: Arc::new(FakeSearch {
                delay: Some(Duration::from_secs(30)),
                ..Default::default()
            }),
            ..Fakes::new()
        };
        let mut settings = Settings::default();
        settings.pipeline.stage_timeout_secs = 1;
        let orchestrator = fakes.orchestrator(settings, Some("Notes".to_string()));

        let run = orchestrator.run(&science_chapter_one()).await;

        assert_eq!(
            run.videos.failure().map(|f| f.category),
            Some(ErrorCategory::ProviderCommunication)
        );
        assert_eq!(run.summary.status(), StageStatus::Succeeded);
        assert_eq!(run.quiz.status(), StageStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_reports_follow_presentation_order_and_progress() {
        let fakes = Fakes::new();
        let orchestrator = fakes.orchestrator(Settings::default(), Some("Notes".to_string()));
        let events: Mutex<Vec<(Stage, StageStatus)>> = Mutex::new(Vec::new());
        let observer = |stage: Stage, status: StageStatus| {
            events.lock().unwrap().push((stage, status));
        };

        let run = orchestrator
            .run_with_progress(&science_chapter_one(), Some(&observer))
            .await;

        let order: Vec<Stage> = run.reports.iter().map(|r| r.stage).collect();
        assert_eq!(order, Stage::ALL.to_vec());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 15);
        for stage in Stage::ALL {
            let seen: Vec<StageStatus> = events
                .iter()
                .filter(|(s, _)| *s == stage)
                .map(|(_, status)| *status)
                .collect();
            assert_eq!(
                seen,
                vec![StageStatus::Pending, StageStatus::Running, StageStatus::Succeeded]
            );
        }
    }
}
