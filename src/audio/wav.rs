//! WAV container handling.
//!
//! Incoming audio (recorded or uploaded, any rate or channel count) is decoded
//! and brought to 16kHz mono for the transcriber. Synthesized waveforms are
//! encoded to 16-bit PCM mono WAV, the only audio format callers ever see.

use crate::defaults::STT_SAMPLE_RATE;
use crate::error::{Result, VoicedeskError};
use std::io::Cursor;

/// Mono audio decoded from a WAV container.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Samples normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f32 / self.sample_rate as f32
        }
    }
}

/// Decode WAV bytes of any supported sample format, down-mixing to mono.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio> {
    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| VoicedeskError::AudioDecode {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(VoicedeskError::AudioDecode {
            message: "WAV file declares zero channels".to_string(),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>(),
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
        }
    }
    .map_err(|e| VoicedeskError::AudioDecode {
        message: format!("Failed to read WAV samples: {}", e),
    })?;

    let channels = usize::from(spec.channels);
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Decode WAV bytes and convert to 16kHz mono 16-bit PCM for the transcriber.
pub fn decode_for_stt(bytes: &[u8]) -> Result<Vec<i16>> {
    let decoded = decode_wav(bytes)?;
    let samples = resample(&decoded.samples, decoded.sample_rate, STT_SAMPLE_RATE);
    Ok(samples.iter().map(|&s| to_i16(s)).collect())
}

/// Encode mono samples as a 16-bit PCM WAV container.
///
/// Samples outside [-1.0, 1.0] are clipped.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    if sample_rate == 0 {
        return Err(VoicedeskError::AudioEncode {
            message: "sample rate must be positive".to_string(),
        });
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let encode_err = |e: hound::Error| VoicedeskError::AudioEncode {
        message: format!("Failed to write WAV: {}", e),
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(encode_err)?;
    for &sample in samples {
        writer.write_sample(to_i16(sample)).map_err(encode_err)?;
    }
    writer.finalize().map_err(encode_err)?;
    Ok(cursor.into_inner())
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Simple linear interpolation resampling.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = (source_pos - source_idx as f64) as f32;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx];
                let right = samples[source_idx + 1];
                left + (right - left) * fraction
            }
        })
        .collect()
}
