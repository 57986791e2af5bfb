pub mod backend;
pub mod buffer;
pub mod mic;

pub use backend::{AudioCapture, AudioFrame, CaptureConfig};
pub use buffer::AudioBuffer;
pub use mic::MicBackend;
