// Integration tests for audio buffer conversion and WAV output.

use anyhow::Result;
use tempfile::TempDir;

use lecture_scribe::audio::buffer::{downmix_to_mono, resample_linear};
use lecture_scribe::audio::AudioBuffer;

#[test]
fn duration_follows_sample_count() {
    let buffer = AudioBuffer::new(vec![0i16; 16_000], 16_000, 1);
    assert!((buffer.duration_seconds() - 1.0).abs() < 1e-9);

    let stereo = AudioBuffer::new(vec![0i16; 16_000], 16_000, 2);
    assert!((stereo.duration_seconds() - 0.5).abs() < 1e-9);
}

#[test]
fn empty_buffer_reports_zero_duration() {
    let buffer = AudioBuffer::new(Vec::new(), 16_000, 1);
    assert!(buffer.is_empty());
    assert_eq!(buffer.duration_seconds(), 0.0);
}

#[test]
fn downmix_sums_interleaved_channels() {
    // Interleaved [L, R, L, R]
    let samples = vec![100i16, 200, -50, 50];
    let mono = downmix_to_mono(&samples, 2);
    assert_eq!(mono, vec![300, 0]);
}

#[test]
fn downmix_clamps_to_i16_range() {
    let samples = vec![i16::MAX, i16::MAX, i16::MIN, i16::MIN];
    let mono = downmix_to_mono(&samples, 2);
    assert_eq!(mono, vec![i16::MAX, i16::MIN]);
}

#[test]
fn downmix_passes_mono_through() {
    let samples = vec![1i16, 2, 3];
    assert_eq!(downmix_to_mono(&samples, 1), samples);
}

#[test]
fn resample_halves_the_sample_count() {
    let samples: Vec<i16> = (0..32_000).map(|i| (i % 100) as i16).collect();
    let resampled = resample_linear(&samples, 32_000, 16_000);
    assert_eq!(resampled.len(), 16_000);
}

#[test]
fn resample_preserves_constant_signals() {
    let samples = vec![1234i16; 4410];
    let resampled = resample_linear(&samples, 44_100, 16_000);
    assert!(!resampled.is_empty());
    assert!(resampled.iter().all(|&s| s == 1234));
}

#[test]
fn resample_same_rate_is_identity() {
    let samples = vec![5i16, -5, 10];
    assert_eq!(resample_linear(&samples, 16_000, 16_000), samples);
}

#[test]
fn converted_reaches_the_engine_format() {
    // 1 second of 48kHz stereo
    let samples = vec![100i16; 48_000 * 2];
    let buffer = AudioBuffer::new(samples, 48_000, 2);

    let converted = buffer.converted(16_000, 1);

    assert_eq!(converted.sample_rate, 16_000);
    assert_eq!(converted.channels, 1);
    assert_eq!(converted.samples.len(), 16_000);
    assert!((converted.duration_seconds() - 1.0).abs() < 0.01);
}

#[test]
fn wav_round_trip_preserves_spec_and_samples() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("round-trip.wav");

    let samples: Vec<i16> = (0..1600).map(|i| ((i * 7) % 1000) as i16 - 500).collect();
    let buffer = AudioBuffer::new(samples.clone(), 16_000, 1);
    buffer.write_wav(&path)?;

    let reader = hound::WavReader::open(&path)?;
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let read_back: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(read_back, samples);
    Ok(())
}

#[test]
fn write_wav_fails_cleanly_for_a_bad_path() {
    let buffer = AudioBuffer::new(vec![0i16; 16], 16_000, 1);
    let result = buffer.write_wav(std::path::Path::new("/nonexistent/dir/out.wav"));
    assert!(result.is_err());
}
