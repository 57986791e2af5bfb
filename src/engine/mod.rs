pub mod ollama;
pub mod whisper;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::PipelineError;

pub use ollama::Ollama;
pub use whisper::WhisperCli;

/// Result of a transcription pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// Usable transcript text.
    Text(String),
    /// The engine found no usable speech (silence, blank markers, or no
    /// output at all). Reported distinctly so empty content is never
    /// summarized.
    NoSpeech,
}

/// Speech-to-text capability.
///
/// Engines are external; this trait is the narrow seam that keeps them
/// swappable without touching the session logic.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<TranscriptOutcome, PipelineError>;

    /// Path of any transcript file the engine leaves on disk for `audio`.
    /// The caller owns cleanup of this file.
    fn sidecar_path(&self, _audio: &Path) -> Option<PathBuf> {
        None
    }

    /// Engine name for logging and user-facing messages.
    fn name(&self) -> &str;
}

/// Summarization capability against a language model.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<String, PipelineError>;

    /// Model/service name for logging and user-facing messages.
    fn name(&self) -> &str;
}
