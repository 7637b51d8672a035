//! Three-slider gain processor
//!
//! The bass/mid/treble controls are plain scalar gains. Each sample is
//! scaled by all three and the results are averaged, so the output is
//! `s * (bass + mid + treble) / 3` with no frequency dependence. The
//! three-way split is kept as-is to preserve the established behavior of
//! the controls.

use std::fmt;

use crate::engine::AudioBuffer;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a slider percentage to a linear factor (100% = 1.0)
#[inline]
pub fn percent_to_factor(percent: i64) -> f64 {
    percent as f64 / 100.0
}

/// Representable signed range for a bit depth
///
/// Depths outside 1..=32 are coerced into that range.
#[inline]
pub fn sample_range(bit_depth: u16) -> (f64, f64) {
    let bits = u32::from(bit_depth.clamp(1, 32));
    let half = 1i64 << (bits - 1);
    (-(half as f64), (half - 1) as f64)
}

// ============================================================================
// Gain Settings
// ============================================================================

/// Linear gain factors for the three sliders
///
/// Immutable once parsed. Factors are not range checked: negative or very
/// large values are computed and then clamped per sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainSettings {
    pub bass: f64,
    pub mid: f64,
    pub treble: f64,
}

impl GainSettings {
    /// Create settings from linear factors
    pub fn new(bass: f64, mid: f64, treble: f64) -> Self {
        Self { bass, mid, treble }
    }

    /// Create settings from slider percentages
    pub fn from_percentages(bass: i64, mid: i64, treble: i64) -> Self {
        Self::new(
            percent_to_factor(bass),
            percent_to_factor(mid),
            percent_to_factor(treble),
        )
    }

    /// All three factors at 1.0
    pub fn unity() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Effective single gain, `(bass + mid + treble) / 3`
    pub fn combined(&self) -> f64 {
        (self.bass + self.mid + self.treble) / 3.0
    }

    /// Apply the gains to one sample
    ///
    /// Computes the average of the three scaled samples, saturates it to
    /// `[min, max]` and truncates toward zero. NaN results map to 0.
    #[inline]
    pub fn apply_to_sample(&self, sample: i32, min: f64, max: f64) -> i32 {
        let s = f64::from(sample);
        let combined = (s * self.bass + s * self.mid + s * self.treble) / 3.0;
        combined.clamp(min, max) as i32
    }
}

impl Default for GainSettings {
    fn default() -> Self {
        Self::unity()
    }
}

impl fmt::Display for GainSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bass={:.2} mid={:.2} treble={:.2}",
            self.bass, self.mid, self.treble
        )
    }
}

// ============================================================================
// Processing
// ============================================================================

/// Apply gains to an interleaved sample slice in place
///
/// Only complete frames are processed; a trailing partial frame is left
/// untouched. Zero channels is a no-op.
pub fn apply_interleaved(
    samples: &mut [i32],
    channels: usize,
    bit_depth: u16,
    gains: &GainSettings,
) {
    if channels == 0 {
        return;
    }

    let (min, max) = sample_range(bit_depth);
    for frame in samples.chunks_exact_mut(channels) {
        for sample in frame.iter_mut() {
            *sample = gains.apply_to_sample(*sample, min, max);
        }
    }
}

/// Gain processor applied to whole buffers
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeBandGain {
    settings: GainSettings,
}

impl ThreeBandGain {
    pub fn new(settings: GainSettings) -> Self {
        Self { settings }
    }

    /// Process the buffer in place using its own bit depth for clamping
    pub fn process(&self, buffer: &mut AudioBuffer) {
        let channels = buffer.channels() as usize;
        let bit_depth = buffer.bit_depth();
        apply_interleaved(buffer.samples_mut(), channels, bit_depth, &self.settings);
    }
}
