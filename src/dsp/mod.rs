//! DSP Module
//!
//! Sample processing applied between decode and encode.

mod gain;

pub use gain::{apply_interleaved, percent_to_factor, sample_range, GainSettings, ThreeBandGain};
