//! Primer CLI entry point.

use anyhow::Result;
use clap::Parser;
use primer::cli::commands::{self, GenerateArgs};
use primer::cli::{Cli, Commands};
use primer::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("primer={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Generate {
            topic,
            class,
            subject,
            chapter,
            output_dir,
            json,
            no_video,
            no_thumbnail,
            no_quiz,
            questions,
        } => {
            let args = GenerateArgs {
                topic,
                class,
                subject,
                chapter,
                output_dir,
                json,
                no_video,
                no_thumbnail,
                no_quiz,
                questions,
            };
            commands::run_generate(args, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, &config_path)?;
        }
    }

    Ok(())
}
