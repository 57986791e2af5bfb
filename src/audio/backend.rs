use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::PipelineError;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for an audio capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sample rate the session converts to before transcription
    pub target_sample_rate: u32,
    /// Channel count the session converts to before transcription
    pub target_channels: u16,
    /// Frame queue depth between the capture callback and the consumer
    pub channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16_000, // 16kHz for Whisper
            target_channels: 1,         // Mono
            channel_capacity: 64,
        }
    }
}

/// Audio capture backend trait
///
/// The production implementation captures the default microphone through
/// cpal; tests substitute a scripted source that feeds canned frames.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames. The
    /// channel closes when the capture stops or the source ends.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, PipelineError>;

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> Result<(), PipelineError>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
