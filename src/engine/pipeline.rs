//! Decode, process, encode
//!
//! The whole upload is held in memory: bytes are decoded into a buffer,
//! the gain processor runs over it, and the buffer is re-encoded with the
//! format it was decoded with. Bytes of a trailing partial frame pass
//! through unchanged.

use tracing::debug;

use crate::dsp::{GainSettings, ThreeBandGain};
use crate::engine::io::{decode_wav, encode_wav};
use crate::error::Result;

/// Apply the gain settings to a WAV file held in memory
///
/// # Errors
/// * `InvalidFormat` - if the bytes are not a supported WAV container
/// * `DecodeFailure` - if the sample data is corrupt
/// * `EncodeFailure` - if the processed buffer cannot be written back
pub fn process_file(raw: &[u8], gains: &GainSettings) -> Result<Vec<u8>> {
    let mut buffer = decode_wav(raw)?;
    let peak_before = buffer.peak();

    ThreeBandGain::new(*gains).process(&mut buffer);

    debug!(
        "Processed {} frames ({:.2}s) with {}: peak {} -> {}",
        buffer.num_frames(),
        buffer.duration_secs(),
        gains,
        peak_before,
        buffer.peak()
    );

    encode_wav(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AudioBuffer;

    fn wav_bytes(samples: Vec<i32>, sample_rate: u32, channels: u16) -> Vec<u8> {
        let buffer = AudioBuffer::new(samples, sample_rate, channels, 16).unwrap();
        encode_wav(&buffer).unwrap()
    }

    #[test]
    fn test_unity_gains_preserve_samples() {
        let samples: Vec<i32> = (-50..50).map(|i| i * 300).collect();
        let input = wav_bytes(samples.clone(), 22050, 2);

        let output = process_file(&input, &GainSettings::unity()).unwrap();
        let decoded = decode_wav(&output).unwrap();
        assert_eq!(decoded.samples(), samples.as_slice());
    }

    #[test]
    fn test_silence_gains() {
        let input = wav_bytes(vec![1000, -1000, 32767, -32768], 8000, 1);
        let output = process_file(&input, &GainSettings::from_percentages(0, 0, 0)).unwrap();
        let decoded = decode_wav(&output).unwrap();
        assert!(decoded.samples().iter().all(|&s| s == 0));
        assert_eq!(decoded.len(), 4);
    }

    #[test]
    fn test_rejects_garbage() {
        let err = process_file(b"ID3\x04not a wav", &GainSettings::unity()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FORMAT");
    }
}
