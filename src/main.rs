use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use lecture_scribe::{
    spawn_key_listener, CaptureConfig, Config, MicBackend, Ollama, Session, SessionConfig,
    SessionOutcome, WhisperCli,
};

/// Record a lecture, transcribe it with a local speech engine, and distill a
/// study summary with a locally hosted language model.
#[derive(Debug, Parser)]
#[command(name = "lecture-scribe", version, about)]
struct Cli {
    /// Session name; the summary is written as <NAME>_summary.txt
    name: Option<String>,

    /// Config file (TOML), with or without extension
    #[arg(long, default_value = "config/lecture-scribe")]
    config: String,

    /// Override the output directory from the config file
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config).context("failed to load configuration")?;

    let mut session_config = SessionConfig {
        output_dir: cli.output_dir.unwrap_or_else(|| cfg.output.directory.clone()),
        max_duration: Duration::from_secs(cfg.audio.max_duration_secs),
        target_sample_rate: cfg.audio.sample_rate,
        target_channels: cfg.audio.channels,
        wrap_width: cfg.output.wrap_width,
        ..SessionConfig::default()
    };
    if let Some(name) = cli.name {
        session_config.name = name;
    }

    println!("{}", "=".repeat(60));
    println!("LECTURE RECORDER & SUMMARIZER");
    println!("{}", "=".repeat(60));
    println!(
        "\nSummary will be saved as: {}",
        session_config.summary_path().display()
    );
    println!("\n  Instructions:");
    println!("  - Press SPACE to start/stop recording");
    println!("  - Press 'q' to exit\n");

    let capture = MicBackend::new(CaptureConfig {
        target_sample_rate: cfg.audio.sample_rate,
        target_channels: cfg.audio.channels,
        channel_capacity: cfg.audio.channel_capacity,
    });
    let transcriber = WhisperCli::new(cfg.transcriber.clone());
    let summarizer =
        Ollama::new(cfg.summarizer.clone()).context("failed to build inference client")?;

    let control = spawn_key_listener(8);
    let session = Session::new(
        session_config,
        Box::new(capture),
        Box::new(transcriber),
        Box::new(summarizer),
    );

    match session.run(control).await {
        Ok(SessionOutcome::Summarized(path)) => {
            info!("session complete: {}", path.display());
        }
        Ok(SessionOutcome::NoSpeech) => {
            println!("Session ended: no speech was detected, so no summary was written.");
        }
        Ok(SessionOutcome::Cancelled) => {
            println!("Exiting without a summary.");
        }
        Err(e) => {
            anyhow::bail!("session failed during {}: {e}", e.stage());
        }
    }

    Ok(())
}
