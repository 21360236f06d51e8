//! WAV decoding into a playable mono buffer.

use std::io::Cursor;
use std::sync::Arc;

use hound::{SampleFormat, WavReader};
use nebula_signal::{AudioDecoder, DecodeError};

/// Decoded PCM, downmixed to mono f32 in -1..1.
#[derive(Clone, Debug)]
pub struct PcmBuffer {
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// hound-backed decoder for RIFF/WAVE bytes.
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    type Buffer = PcmBuffer;

    fn decode(&mut self, bytes: &[u8]) -> Result<PcmBuffer, DecodeError> {
        let mut reader =
            WavReader::new(Cursor::new(bytes)).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| DecodeError::Malformed(e.to_string()))?,
            (SampleFormat::Int, bits @ 8..=32) => {
                let scale = 1.0 / (1i64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| DecodeError::Malformed(e.to_string()))?
            }
            (format, bits) => {
                return Err(DecodeError::Malformed(format!(
                    "unsupported sample format: {:?} at {} bits",
                    format, bits
                )))
            }
        };

        if interleaved.is_empty() {
            return Err(DecodeError::Empty);
        }

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        Ok(PcmBuffer {
            samples: samples.into(),
            sample_rate: spec.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes_i16(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn wav_bytes_f32(channels: u16, sample_rate: u32, samples: &[f32]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_decodes_mono_int16() {
        let samples: Vec<i16> = (0..100).map(|i| (i * 100) as i16).collect();
        let bytes = wav_bytes_i16(1, 44100, &samples);

        let buffer = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(buffer.samples.len(), 100);
        assert_eq!(buffer.sample_rate, 44100);
        assert_eq!(buffer.samples[0], 0.0);
        assert!((buffer.samples[99] - 9900.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn test_downmixes_stereo_to_mono() {
        let mut samples = Vec::new();
        for _ in 0..50 {
            samples.push(1000i16);
            samples.push(-1000i16);
        }
        let bytes = wav_bytes_i16(2, 48000, &samples);

        let buffer = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(buffer.samples.len(), 50);
        for &s in buffer.samples.iter() {
            assert!(s.abs() < 1e-6, "stereo opposites should cancel, got {}", s);
        }
    }

    #[test]
    fn test_decodes_float32() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
        let bytes = wav_bytes_f32(1, 22050, &samples);

        let buffer = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(buffer.samples.len(), 10);
        assert!((buffer.samples[5] - 0.5).abs() < 1e-6);
        assert!((buffer.duration() - 10.0 / 22050.0).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_bytes_fail_with_decode_error() {
        let err = WavDecoder.decode(b"definitely not a wav file").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_empty_stream_is_rejected() {
        let bytes = wav_bytes_i16(1, 44100, &[]);
        let err = WavDecoder.decode(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Empty));
    }
}
