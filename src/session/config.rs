use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one recording session, fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session name; every artifact filename derives from it.
    pub name: String,

    /// Directory the summary (and transient artifacts) are written to.
    pub output_dir: PathBuf,

    /// Hard ceiling on recording time; the recorder auto-stops when reached.
    pub max_duration: Duration,

    /// Sample rate of the audio handed to the speech engine (Whisper expects 16kHz).
    pub target_sample_rate: u32,

    /// Channel count of the audio handed to the speech engine (1 = mono).
    pub target_channels: u16,

    /// Column width for the written summary; 0 disables wrapping.
    pub wrap_width: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: format!("lecture-{}", uuid::Uuid::new_v4()),
            output_dir: PathBuf::from("."),
            max_duration: Duration::from_secs(90 * 60),
            target_sample_rate: 16_000,
            target_channels: 1,
            wrap_width: 80,
        }
    }
}

impl SessionConfig {
    /// Transient WAV file the recording is written to before transcription.
    pub fn audio_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.wav", self.name))
    }

    /// The one artifact that outlives the session.
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_summary.txt", self.name))
    }
}
