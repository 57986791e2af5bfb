use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::error::PipelineError;

/// A completed recording, owned by the session until it is written out and
/// handed to the speech engine.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Downmix and resample into the format the speech engine expects.
    pub fn converted(self, target_rate: u32, target_channels: u16) -> AudioBuffer {
        let mut buf = self;

        if buf.channels != target_channels && target_channels == 1 {
            buf = AudioBuffer::new(downmix_to_mono(&buf.samples, buf.channels), buf.sample_rate, 1);
        }

        if buf.sample_rate != target_rate && buf.channels == 1 {
            buf = AudioBuffer::new(
                resample_linear(&buf.samples, buf.sample_rate, target_rate),
                target_rate,
                buf.channels,
            );
        }

        buf
    }

    /// Write the buffer to disk as a 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), PipelineError> {
        let storage = |e: hound::Error| PipelineError::Storage {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec).map_err(storage)?;
        for &sample in &self.samples {
            writer.write_sample(sample).map_err(storage)?;
        }
        writer.finalize().map_err(storage)?;

        info!(
            "wrote {:.1}s of audio to {} ({}Hz, {} ch)",
            self.duration_seconds(),
            path.display(),
            self.sample_rate,
            self.channels
        );

        Ok(())
    }
}

/// Sum interleaved channels into mono, clamped to the i16 range.
pub fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let n = channels as usize;
    samples
        .chunks_exact(n)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16
        })
        .collect()
}

/// Linear-interpolation resampler for mono PCM.
pub fn resample_linear(samples: &[i16], src_rate: u32, dst_rate: u32) -> Vec<i16> {
    if src_rate == dst_rate || src_rate == 0 || dst_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let out_len = ((samples.len() as u64 * dst_rate as u64) / src_rate as u64).max(1) as usize;
    let step = src_rate as f64 / dst_rate as f64;

    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * step;
        let idx = pos as usize;
        if idx + 1 >= samples.len() {
            out.push(samples[samples.len() - 1]);
        } else {
            let frac = pos - idx as f64;
            let a = samples[idx] as f64;
            let b = samples[idx + 1] as f64;
            out.push((a + (b - a) * frac).round() as i16);
        }
    }
    out
}
