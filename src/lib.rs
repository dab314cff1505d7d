//! Primer - study resources from a single topic
//!
//! A CLI tool that turns an NCERT chapter, or any topic, into a small set of
//! learner resources.
//!
//! # Overview
//!
//! For one topic Primer produces:
//! - A summary of the important topics and sub topics
//! - A narration of that summary as an audio URL
//! - A list of related videos
//! - A thumbnail image
//! - A multiple-choice quiz with an answer key, rendered as a PDF
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `topic` - Topic selection and the canonical query string
//! - `agent` - Summary generation
//! - `video_search` - Video search through yt-dlp
//! - `truncate` - Character-limit enforcement
//! - `narration` - Speech synthesis
//! - `thumbnail` - Image generation
//! - `quiz` - Quiz generation and PDF rendering
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use primer::config::Settings;
//! use primer::orchestrator::Orchestrator;
//! use primer::topic::{Subject, Topic};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let topic = Topic::chapter(10, Subject::Science, 1)?;
//!     let run = orchestrator.run(&topic).await;
//!     println!("{} stage(s) failed", run.failed_stages());
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod narration;
pub mod openai;
pub mod orchestrator;
pub mod quiz;
pub mod thumbnail;
pub mod topic;
pub mod truncate;
pub mod video_search;

pub use error::{PrimerError, Result};
