use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Prompt sent to the summarizer, with `{transcript}` substituted at runtime.
/// The template shapes the structure of the output (summary, key concepts,
/// definitions, quiz questions); the model fills in the content.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
You are an expert in your field be confident in your answers. Please analyze this lecture transcription and provide:

1. A concise summary of the main topics covered
2. Key concepts discussed
3. Important terms and their definitions
4. Generate 5 quiz questions based on the lecture transcription

Lecture Transcription:
{transcript}

Please format your response clearly with sections for Summary, Key Concepts, and Terms & Definitions, and 5 questions from the summary that could be on a quiz.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub transcriber: TranscriberConfig,
    pub summarizer: SummarizerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of the audio handed to the speech engine.
    pub sample_rate: u32,
    /// Channel count of the audio handed to the speech engine.
    pub channels: u16,
    /// Recording ceiling; the recorder auto-stops when it is reached.
    pub max_duration_secs: u64,
    /// Frame queue depth between the capture callback and the session.
    pub channel_capacity: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000, // Whisper expects 16kHz
            channels: 1,         // Mono
            max_duration_secs: 90 * 60,
            channel_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// whisper.cpp CLI binary, either a bare name resolved via PATH or a path.
    pub binary: PathBuf,
    /// ggml model file for the speech engine.
    pub model: PathBuf,
    /// Spoken language passed to the engine.
    pub language: String,
    /// Worker threads for the engine.
    pub threads: u32,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("whisper-cli"),
            model: PathBuf::from("models/ggml-base.en.bin"),
            language: "en".to_string(),
            threads: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Base URL of the local inference service.
    pub endpoint: String,
    /// Model identifier the service should generate with.
    pub model: String,
    /// Request timeout for one generation call.
    pub timeout_secs: u64,
    /// Retry a single time when the service is unreachable.
    pub retry_once: bool,
    /// Prompt template; `{transcript}` is replaced with the transcript text.
    pub prompt_template: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "granite3.3:2b".to_string(),
            timeout_secs: 300,
            retry_once: true,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the summary is written to.
    pub directory: PathBuf,
    /// Column width for the written summary; 0 disables wrapping.
    pub wrap_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            wrap_width: 80,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to the built-in
    /// defaults for anything the file leaves out. A missing file is fine.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_voice_pipeline() {
        let cfg = Config::default();
        assert_eq!(cfg.audio.sample_rate, 16_000);
        assert_eq!(cfg.audio.channels, 1);
        assert_eq!(cfg.audio.max_duration_secs, 5400);
        assert_eq!(cfg.summarizer.endpoint, "http://localhost:11434");
        assert!(cfg.summarizer.retry_once);
        assert!(cfg.summarizer.prompt_template.contains("{transcript}"));
        assert_eq!(cfg.output.wrap_width, 80);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let cfg = Config::load("/nonexistent/lecture-scribe-config").unwrap();
        assert_eq!(cfg.transcriber.language, "en");
        assert_eq!(cfg.summarizer.model, "granite3.3:2b");
    }
}
