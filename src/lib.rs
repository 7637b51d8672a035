//! WAV Equalizer - upload, adjust, download
//!
//! A small web service: a browser uploads a WAV file, sets three gain
//! sliders labeled bass/mid/treble, and fetches the processed result.
//!
//! # Architecture
//!
//! - `engine`: audio buffer, WAV codec boundary, decode/process/encode
//! - `dsp`: the gain processor
//! - `server`: HTTP routes, handlers and the two file stores
//! - `config`: server configuration
//! - `cli`: command-line entry points
//!
//! The sliders are plain scalar gains averaged together; there is no
//! frequency-selective filtering.

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod server;

pub use config::ServerConfig;
pub use error::{EqualizerError, Result};
