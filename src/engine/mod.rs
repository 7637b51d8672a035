//! Audio Engine Module
//!
//! - Audio buffer type
//! - WAV codec boundary
//! - Decode/process/encode pipeline

pub mod buffer;
pub mod io;
pub mod pipeline;

pub use buffer::AudioBuffer;
pub use io::{decode_wav, encode_wav, is_valid_wav, probe_header, WavHeader};
pub use pipeline::process_file;
