//! Decoded mono audio clips.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AudioError;

/// A fully decoded mono clip
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Arc<[f32]>,
    sample_rate_hz: u32,
}

impl AudioClip {
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate_hz: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate_hz,
        }
    }

    /// Decode a WAV file, keeping only the first channel.
    pub fn load_wav(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()?
            }
        };

        if channels > 1 {
            warn!(channels, "multichannel clip, using the first channel");
        }
        let samples: Vec<f32> = interleaved.iter().step_by(channels).copied().collect();
        if samples.is_empty() {
            return Err(AudioError::EmptyClip);
        }

        debug!(
            path = %path.display(),
            samples = samples.len(),
            sample_rate = spec.sample_rate,
            "decoded clip"
        );
        Ok(Self::new(samples, spec.sample_rate))
    }

    /// Write a clip as 32-bit float WAV, broadcasting to `channels`
    pub fn write_wav(
        path: impl AsRef<Path>,
        samples: &[f32],
        sample_rate_hz: u32,
        channels: u16,
    ) -> Result<(), AudioError> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: sample_rate_hz,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in samples {
            for _ in 0..channels {
                writer.write_sample(sample)?;
            }
        }
        writer.finalize()?;
        Ok(())
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn shared_samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate_hz.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_round_trip_keeps_first_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        AudioClip::write_wav(&path, &[0.25, -0.5, 0.75], 22050, 2).unwrap();
        let clip = AudioClip::load_wav(&path).unwrap();

        assert_eq!(clip.sample_rate_hz(), 22050);
        assert_eq!(clip.samples(), &[0.25, -0.5, 0.75]);
    }

    #[test]
    fn test_int_wav_is_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("int.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(16384i16).unwrap();
        writer.write_sample(-32768i16).unwrap();
        writer.finalize().unwrap();

        let clip = AudioClip::load_wav(&path).unwrap();
        assert_eq!(clip.samples(), &[0.5, -1.0]);
    }

    #[test]
    fn test_empty_wav_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        AudioClip::write_wav(&path, &[], 44100, 1).unwrap();
        assert!(matches!(
            AudioClip::load_wav(&path),
            Err(AudioError::EmptyClip)
        ));
    }

    #[test]
    fn test_duration() {
        let clip = AudioClip::new(vec![0.0; 22050], 44100);
        assert!((clip.duration_s() - 0.5).abs() < 1e-9);
    }
}
