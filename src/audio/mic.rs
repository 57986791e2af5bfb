use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::backend::{AudioCapture, AudioFrame, CaptureConfig};
use crate::error::PipelineError;

/// Microphone capture backend built on cpal.
///
/// The cpal stream is not `Send`, so it lives on a dedicated thread for the
/// whole capture. Frames are pushed into a bounded channel with `try_send`; a
/// full queue drops the frame rather than stalling the audio callback.
/// Capture runs at the device's native format; the session converts to the
/// target format when the buffer is written out.
pub struct MicBackend {
    config: CaptureConfig,
    stop_flag: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    thread: Option<thread::JoinHandle<()>>,
    capturing: bool,
}

impl MicBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicU64::new(0)),
            thread: None,
            capturing: false,
        }
    }
}

#[async_trait]
impl AudioCapture for MicBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, PipelineError> {
        if self.capturing {
            return Err(PipelineError::Device("already capturing".to_string()));
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| PipelineError::Device("no audio input device available".to_string()))?;

        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
        let supported = device.default_input_config().map_err(|e| {
            PipelineError::Device(format!("no supported input configuration: {e}"))
        })?;

        let sample_format = supported.sample_format();
        let stream_config: StreamConfig = supported.into();

        info!(
            "capturing from '{}' at {}Hz, {} channels, {:?}",
            device_name, stream_config.sample_rate.0, stream_config.channels, sample_format
        );

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), String>>();

        self.stop_flag.store(false, Ordering::SeqCst);
        self.dropped.store(0, Ordering::SeqCst);
        let stop_flag = Arc::clone(&self.stop_flag);
        let dropped = Arc::clone(&self.dropped);

        let handle = thread::spawn(move || {
            let built = build_stream(&device, &stream_config, sample_format, tx, dropped);
            match built {
                Ok(stream) => {
                    let playing = stream.play().map_err(|e| e.to_string());
                    let _ = ready_tx.send(playing);
                    while !stop_flag.load(Ordering::SeqCst) {
                        thread::sleep(Duration::from_millis(50));
                    }
                    // Dropping the stream releases the device; dropping the
                    // sender closes the frame channel.
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        });
        self.thread = Some(handle);

        let started = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| PipelineError::Device(format!("capture thread failed: {e}")))?
            .map_err(|_| PipelineError::Device("capture thread exited early".to_string()))?;

        if let Err(e) = started {
            self.stop_flag.store(true, Ordering::SeqCst);
            if let Some(handle) = self.thread.take() {
                let _ = tokio::task::spawn_blocking(move || handle.join()).await;
            }
            return Err(PipelineError::Device(e));
        }

        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), PipelineError> {
        if !self.capturing {
            return Ok(());
        }

        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            tokio::task::spawn_blocking(move || handle.join())
                .await
                .map_err(|e| PipelineError::Device(format!("capture thread join failed: {e}")))?
                .map_err(|_| PipelineError::Device("capture thread panicked".to_string()))?;
        }
        self.capturing = false;

        let dropped = self.dropped.load(Ordering::SeqCst);
        if dropped > 0 {
            warn!("{dropped} audio frames dropped (consumer too slow)");
        }
        info!("audio capture stopped");

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "cpal microphone"
    }
}

impl Drop for MicBackend {
    fn drop(&mut self) {
        // The stream thread must not outlive the backend.
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    tx: mpsc::Sender<AudioFrame>,
    dropped: Arc<AtomicU64>,
) -> Result<cpal::Stream, String> {
    match sample_format {
        SampleFormat::I16 => build_stream_typed::<i16>(device, config, tx, dropped),
        SampleFormat::U16 => build_stream_typed::<u16>(device, config, tx, dropped),
        SampleFormat::F32 => build_stream_typed::<f32>(device, config, tx, dropped),
        other => Err(format!("unsupported sample format: {other:?}")),
    }
}

fn build_stream_typed<T>(
    device: &Device,
    config: &StreamConfig,
    tx: mpsc::Sender<AudioFrame>,
    dropped: Arc<AtomicU64>,
) -> Result<cpal::Stream, String>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels;
    let sample_rate = config.sample_rate.0;
    let mut samples_seen: u64 = 0;

    let err_fn = |err| error!("audio stream error: {err}");

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<i16> = data.iter().map(|&s| sample_to_i16(s)).collect();
                let timestamp_ms =
                    samples_seen * 1000 / (sample_rate as u64 * channels.max(1) as u64);
                samples_seen += data.len() as u64;

                let frame = AudioFrame {
                    samples,
                    sample_rate,
                    channels,
                    timestamp_ms,
                };
                if tx.try_send(frame).is_err() {
                    dropped.fetch_add(1, Ordering::Relaxed);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| e.to_string())
}

/// Convert any supported sample type to i16 PCM.
fn sample_to_i16<T>(sample: T) -> i16
where
    T: Sample,
    f32: FromSample<T>,
{
    let f = f32::from_sample(sample).clamp(-1.0, 1.0);
    (f * i16::MAX as f32) as i16
}
