//! CLI module for Primer.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Primer - study resources from a single topic
///
/// Generates a summary, narration, a thumbnail, related videos and a
/// multiple-choice quiz for an NCERT chapter or any free-form topic.
#[derive(Parser, Debug)]
#[command(name = "primer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate every resource for a topic
    Generate {
        /// Free-form topic (omit when using --class/--subject/--chapter)
        topic: Option<String>,

        /// NCERT class level (1-12)
        #[arg(long, requires_all = ["subject", "chapter"], conflicts_with = "topic")]
        class: Option<u8>,

        /// Subject (science, maths, sociology, history, geography, political-science, economics)
        #[arg(long, requires_all = ["class", "chapter"])]
        subject: Option<String>,

        /// Chapter number
        #[arg(long, requires_all = ["class", "subject"])]
        chapter: Option<u32>,

        /// Directory for the quiz PDF and run report
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Also write the run report as JSON
        #[arg(long)]
        json: bool,

        /// Skip the video search stage
        #[arg(long)]
        no_video: bool,

        /// Skip the thumbnail stage
        #[arg(long)]
        no_thumbnail: bool,

        /// Skip the quiz stage
        #[arg(long)]
        no_quiz: bool,

        /// Number of quiz questions
        #[arg(short, long)]
        questions: Option<usize>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (credentials masked)
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
