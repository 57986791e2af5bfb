use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{SpeechToText, TranscriptOutcome};
use crate::config::TranscriberConfig;
use crate::error::PipelineError;

/// Marker whisper.cpp emits for segments with no detected speech.
const BLANK_AUDIO_MARKER: &str = "[BLANK_AUDIO]";

/// Adapter over the whisper.cpp command-line interface.
///
/// The engine is invoked with `-otxt`, which writes the transcript to
/// `<audio>.txt` next to the input file; that file is read back and reported
/// through [`SpeechToText::sidecar_path`] so the session can clean it up.
pub struct WhisperCli {
    config: TranscriberConfig,
}

impl WhisperCli {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Path of the transcript `-otxt` produces for `audio`.
    pub fn transcript_path(audio: &Path) -> PathBuf {
        let mut os = audio.as_os_str().to_os_string();
        os.push(".txt");
        PathBuf::from(os)
    }

    fn check_available(&self) -> Result<(), PipelineError> {
        // A bare command name is resolved through PATH at spawn time; only
        // explicit paths can be checked up front.
        if self.config.binary.components().count() > 1 && !self.config.binary.exists() {
            return Err(PipelineError::EngineUnavailable(format!(
                "whisper binary not found at {}",
                self.config.binary.display()
            )));
        }
        if !self.config.model.exists() {
            return Err(PipelineError::EngineUnavailable(format!(
                "whisper model not found at {}",
                self.config.model.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechToText for WhisperCli {
    async fn transcribe(&self, audio: &Path) -> Result<TranscriptOutcome, PipelineError> {
        self.check_available()?;

        let transcript_path = Self::transcript_path(audio);
        info!(
            "running {} on {}",
            self.config.binary.display(),
            audio.display()
        );

        let output = Command::new(&self.config.binary)
            .arg("-f")
            .arg(audio)
            .arg("-m")
            .arg(&self.config.model)
            .arg("-l")
            .arg(&self.config.language)
            .arg("-t")
            .arg(self.config.threads.to_string())
            .arg("-nt") // no timestamps
            .arg("-otxt") // write transcript next to the audio file
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PipelineError::EngineUnavailable(format!(
                    "whisper binary '{}' not found on PATH",
                    self.config.binary.display()
                )),
                _ => PipelineError::Transcription(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::Transcription(format!(
                "whisper exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // whisper.cpp reports progress on stderr even on success.
        debug!(
            "whisper output: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );

        // Silent or near-empty audio can leave no transcript file at all.
        let text = match tokio::fs::read_to_string(&transcript_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TranscriptOutcome::NoSpeech);
            }
            Err(e) => {
                return Err(PipelineError::Storage {
                    path: transcript_path,
                    message: e.to_string(),
                });
            }
        };

        let cleaned = text.replace(BLANK_AUDIO_MARKER, " ");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Ok(TranscriptOutcome::NoSpeech);
        }

        Ok(TranscriptOutcome::Text(cleaned.to_string()))
    }

    fn sidecar_path(&self, audio: &Path) -> Option<PathBuf> {
        Some(Self::transcript_path(audio))
    }

    fn name(&self) -> &str {
        "whisper.cpp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_path_appends_txt() {
        let path = WhisperCli::transcript_path(Path::new("/tmp/lecture.wav"));
        assert_eq!(path, PathBuf::from("/tmp/lecture.wav.txt"));
    }
}
