//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::ServerConfig;
use crate::dsp::GainSettings;
use crate::engine::{decode_wav, probe_header, process_file, WavHeader};
use crate::error::{EqualizerError, Result};

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => EqualizerError::NotFound {
            name: path.display().to_string(),
        },
        _ => EqualizerError::Io(e),
    })
}

/// Run the HTTP server on a fresh tokio runtime
pub fn serve(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(crate::server::serve(config))
}

/// Apply the equalizer to a file on disk.
pub fn process(input: &Path, output: &Path, gains: &GainSettings) -> Result<()> {
    info!("Processing {} with {}", input.display(), gains);

    let raw = read_input(input)?;
    let processed = process_file(&raw, gains)?;
    fs::write(output, &processed)?;

    println!("Wrote {} ({} bytes)", output.display(), processed.len());
    Ok(())
}

/// Summary printed by `info`
#[derive(Debug, Serialize)]
pub struct FileInfo {
    #[serde(flatten)]
    pub header: WavHeader,
    pub frames: usize,
    pub duration_secs: f64,
}

/// Probe and decode a file, returning its format summary.
pub fn file_info(path: &Path) -> Result<FileInfo> {
    let raw = read_input(path)?;
    let header = probe_header(&raw)?;
    let buffer = decode_wav(&raw)?;

    Ok(FileInfo {
        header,
        frames: buffer.num_frames(),
        duration_secs: buffer.duration_secs(),
    })
}

/// Print the format of a WAV file.
pub fn info(path: &Path, json: bool) -> Result<()> {
    let summary = file_info(path)?;

    if json {
        let text = serde_json::to_string_pretty(&summary).map_err(|e| EqualizerError::Internal {
            reason: e.to_string(),
        })?;
        println!("{}", text);
    } else {
        println!("File:        {}", path.display());
        println!("Sample rate: {} Hz", summary.header.sample_rate);
        println!("Channels:    {}", summary.header.channels);
        println!("Bit depth:   {}", summary.header.bits_per_sample);
        println!("Frames:      {}", summary.frames);
        println!("Duration:    {:.3}s", summary.duration_secs);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{encode_wav, AudioBuffer};
    use tempfile::TempDir;

    #[test]
    fn test_process_command() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");

        let buffer = AudioBuffer::new(vec![300, -300, 600, -600], 8000, 2, 16).unwrap();
        fs::write(&input, encode_wav(&buffer).unwrap()).unwrap();

        process(&input, &output, &GainSettings::from_percentages(0, 0, 300)).unwrap();

        let result = decode_wav(&fs::read(&output).unwrap()).unwrap();
        assert_eq!(result.samples(), buffer.samples());
    }

    #[test]
    fn test_process_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = process(
            &dir.path().join("nope.wav"),
            &dir.path().join("out.wav"),
            &GainSettings::unity(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!dir.path().join("out.wav").exists());
    }

    #[test]
    fn test_file_info() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        let buffer = AudioBuffer::new(vec![0; 8000], 8000, 1, 16).unwrap();
        fs::write(&path, encode_wav(&buffer).unwrap()).unwrap();

        let summary = file_info(&path).unwrap();
        assert_eq!(summary.header.sample_rate, 8000);
        assert_eq!(summary.header.channels, 1);
        assert_eq!(summary.frames, 8000);
        assert!((summary.duration_secs - 1.0).abs() < 1e-9);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["sample_rate"], 8000);
        assert_eq!(json["frames"], 8000);
    }
}
