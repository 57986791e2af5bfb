use std::path::PathBuf;
use thiserror::Error;

/// Everything that can sink a session, one variant per failure kind.
///
/// Cancellation is not represented here: quitting is a normal early exit and
/// is reported through `SessionOutcome::Cancelled` instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("audio device error: {0}")]
    Device(String),

    #[error("speech engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("inference service unreachable at {endpoint} - start it with `ollama serve`")]
    ServiceUnavailable { endpoint: String },

    #[error("model '{model}' is not available - pull it with `ollama pull {model}`")]
    ModelNotFound { model: String },

    #[error("inference request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("filesystem error at {path}: {message}")]
    Storage { path: PathBuf, message: String },
}

impl PipelineError {
    /// Pipeline stage the error belongs to, for user-facing reporting.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Device(_) => "recording",
            PipelineError::EngineUnavailable(_) | PipelineError::Transcription(_) => {
                "transcription"
            }
            PipelineError::ServiceUnavailable { .. }
            | PipelineError::ModelNotFound { .. }
            | PipelineError::Timeout { .. }
            | PipelineError::Summarization(_) => "summarization",
            PipelineError::Storage { .. } => "storage",
        }
    }
}
