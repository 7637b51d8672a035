//! Audio Buffer
//!
//! Interleaved integer PCM samples together with the format metadata they
//! were decoded with. The buffer is created by the codec boundary, mutated
//! in place by the gain processor and dropped once re-encoded.

use crate::error::{EqualizerError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Smallest supported bit depth
pub const MIN_BIT_DEPTH: u16 = 1;

/// Largest supported bit depth (samples are held as `i32`)
pub const MAX_BIT_DEPTH: u16 = 32;

// ============================================================================
// AudioBuffer
// ============================================================================

/// Interleaved PCM audio
///
/// Invariant: `samples.len() % channels == 0`. Bytes of an incomplete final
/// frame are carried verbatim in `trailing` and never decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i32>,
    sample_rate: u32,
    channels: u16,
    bit_depth: u16,
    trailing: Vec<u8>,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples
    ///
    /// # Errors
    /// * `InvalidFormat` - zero sample rate or channel count, a bit depth
    ///   outside 1..=32, or a trailing partial frame
    pub fn new(samples: Vec<i32>, sample_rate: u32, channels: u16, bit_depth: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(EqualizerError::InvalidFormat {
                reason: "sample rate must be positive".to_string(),
            });
        }
        if channels == 0 {
            return Err(EqualizerError::InvalidFormat {
                reason: "channel count must be positive".to_string(),
            });
        }
        if !(MIN_BIT_DEPTH..=MAX_BIT_DEPTH).contains(&bit_depth) {
            return Err(EqualizerError::InvalidFormat {
                reason: format!("{}-bit samples are not supported", bit_depth),
            });
        }
        if samples.len() % channels as usize != 0 {
            return Err(EqualizerError::InvalidFormat {
                reason: format!(
                    "{} samples do not divide into {}-channel frames",
                    samples.len(),
                    channels
                ),
            });
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
            bit_depth,
            trailing: Vec::new(),
        })
    }

    /// Attach the raw bytes of a trailing partial frame
    pub fn with_trailing(mut self, trailing: Vec<u8>) -> Self {
        self.trailing = trailing;
        self
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Bits per sample
    pub fn bit_depth(&self) -> u16 {
        self.bit_depth
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Mutable interleaved samples
    pub fn samples_mut(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    /// Raw bytes of the trailing partial frame, empty for whole-frame data
    pub fn trailing(&self) -> &[u8] {
        &self.trailing
    }

    /// Total number of samples across all channels
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of complete frames
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> u32 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buffer = AudioBuffer::new(vec![1, -1, 2, -2], 44100, 2, 16).unwrap();
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.num_frames(), 2);
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.bit_depth(), 16);
        assert_eq!(buffer.peak(), 2);
    }

    #[test]
    fn test_empty_buffer_is_valid() {
        let buffer = AudioBuffer::new(Vec::new(), 8000, 1, 16).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.num_frames(), 0);
        assert_eq!(buffer.duration_secs(), 0.0);
        assert_eq!(buffer.peak(), 0);
    }

    #[test]
    fn test_rejects_partial_frame() {
        let result = AudioBuffer::new(vec![1, 2, 3], 44100, 2, 16);
        assert!(matches!(result, Err(EqualizerError::InvalidFormat { .. })));
    }

    #[test]
    fn test_trailing_bytes_kept_apart() {
        let buffer = AudioBuffer::new(vec![1, 2, 3, 4], 8000, 2, 16)
            .unwrap()
            .with_trailing(vec![0xF4, 0x01]);
        assert_eq!(buffer.trailing(), &[0xF4, 0x01]);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.num_frames(), 2);
    }

    #[test]
    fn test_rejects_bad_format() {
        assert!(AudioBuffer::new(vec![], 0, 1, 16).is_err());
        assert!(AudioBuffer::new(vec![], 8000, 0, 16).is_err());
        assert!(AudioBuffer::new(vec![], 8000, 1, 0).is_err());
        assert!(AudioBuffer::new(vec![], 8000, 1, 33).is_err());
    }

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::new(vec![0; 16000], 8000, 2, 16).unwrap();
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_peak_handles_min_value() {
        let buffer = AudioBuffer::new(vec![i32::MIN, 5], 8000, 1, 32).unwrap();
        assert_eq!(buffer.peak(), 1u32 << 31);
    }
}
