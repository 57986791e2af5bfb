pub mod audio;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod session;
pub mod text;

pub use audio::{AudioBuffer, AudioCapture, AudioFrame, CaptureConfig, MicBackend};
pub use config::Config;
pub use control::{spawn_key_listener, ControlSignal};
pub use engine::{Ollama, SpeechToText, SummaryModel, TranscriptOutcome, WhisperCli};
pub use error::PipelineError;
pub use session::{Session, SessionConfig, SessionOutcome, SessionState};
