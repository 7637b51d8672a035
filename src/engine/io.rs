//! WAV codec boundary
//!
//! Bytes in, `AudioBuffer` out, and the reverse. Decoding and encoding are
//! delegated to hound; this module adds the up-front container check so
//! that malformed headers are rejected before any sample is touched.
//!
//! Only integer PCM is supported. IEEE float files are rejected as an
//! unsupported format.
//!
//! A `data` chunk that ends partway through a frame is decoded over its
//! whole frames. The leftover bytes ride along on the buffer and are
//! written back unchanged after the processed frames.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::Serialize;
use tracing::debug;

use crate::engine::buffer::AudioBuffer;
use crate::error::{EqualizerError, Result};

/// `WAVE_FORMAT_PCM`
pub const FORMAT_PCM: u16 = 0x0001;

/// `WAVE_FORMAT_IEEE_FLOAT`
pub const FORMAT_IEEE_FLOAT: u16 = 0x0003;

/// `WAVE_FORMAT_EXTENSIBLE`
pub const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of the RIFF preamble: "RIFF", length, "WAVE"
const RIFF_HEADER_LEN: usize = 12;

/// Size of a chunk header: id + length
const CHUNK_HEADER_LEN: usize = 8;

/// Minimum length of a `fmt ` chunk body
const MIN_FMT_LEN: usize = 16;

/// Format metadata read from a WAV container without decoding samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavHeader {
    /// Format tag from the `fmt ` chunk
    pub format_tag: u16,
    /// Number of interleaved channels
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bits per sample as declared by the `fmt ` chunk
    pub bits_per_sample: u16,
    /// Bytes per frame as declared by the `fmt ` chunk
    pub block_align: u16,
    /// Declared length of the `data` chunk in bytes
    pub data_len: u32,
}

fn invalid(reason: impl Into<String>) -> EqualizerError {
    EqualizerError::InvalidFormat {
        reason: reason.into(),
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl WavHeader {
    /// Bytes per frame, falling back to the packed size if `block_align` is 0
    pub fn frame_len(&self) -> usize {
        match self.block_align {
            0 => self.channels as usize * ((self.bits_per_sample as usize + 7) / 8),
            n => n as usize,
        }
    }

    /// Bytes at the end of the `data` chunk that do not fill a frame
    pub fn partial_frame_len(&self) -> usize {
        match self.frame_len() {
            0 => 0,
            n => self.data_len as usize % n,
        }
    }
}

/// Check the RIFF/WAVE container and read its format metadata
///
/// Walks the chunk list up to the `data` chunk. The `fmt ` chunk must come
/// first, declare integer PCM (plain or extensible) and carry non-zero
/// channel count, sample rate and bit depth.
///
/// # Errors
/// * `InvalidFormat` - for any structural problem with the container
pub fn probe_header(bytes: &[u8]) -> Result<WavHeader> {
    locate_data(bytes).map(|(header, _)| header)
}

/// Like `probe_header`, also returning the offset of the `data` chunk body
fn locate_data(bytes: &[u8]) -> Result<(WavHeader, usize)> {
    if bytes.len() < RIFF_HEADER_LEN {
        return Err(invalid("file is shorter than a RIFF header"));
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(invalid("missing RIFF signature"));
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(invalid("missing WAVE signature"));
    }

    let mut offset = RIFF_HEADER_LEN;
    let mut fmt: Option<(u16, u16, u32, u16, u16)> = None;

    while offset + CHUNK_HEADER_LEN <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = read_u32(bytes, offset + 4);
        let body = offset + CHUNK_HEADER_LEN;

        match id {
            b"fmt " => {
                let size = size as usize;
                if size < MIN_FMT_LEN || body + size > bytes.len() {
                    return Err(invalid("truncated fmt chunk"));
                }
                let format_tag = read_u16(bytes, body);
                let channels = read_u16(bytes, body + 2);
                let sample_rate = read_u32(bytes, body + 4);
                let block_align = read_u16(bytes, body + 12);
                let bits_per_sample = read_u16(bytes, body + 14);

                match format_tag {
                    FORMAT_PCM | FORMAT_EXTENSIBLE => {}
                    FORMAT_IEEE_FLOAT => {
                        return Err(invalid("IEEE float samples are not supported"))
                    }
                    other => {
                        return Err(invalid(format!("unsupported format tag 0x{:04x}", other)))
                    }
                }
                if channels == 0 {
                    return Err(invalid("fmt chunk declares zero channels"));
                }
                if sample_rate == 0 {
                    return Err(invalid("fmt chunk declares a zero sample rate"));
                }
                if bits_per_sample == 0 {
                    return Err(invalid("fmt chunk declares a zero bit depth"));
                }

                fmt = Some((format_tag, channels, sample_rate, block_align, bits_per_sample));
            }
            b"data" => {
                let (format_tag, channels, sample_rate, block_align, bits_per_sample) =
                    fmt.ok_or_else(|| invalid("data chunk precedes fmt chunk"))?;
                let header = WavHeader {
                    format_tag,
                    channels,
                    sample_rate,
                    bits_per_sample,
                    block_align,
                    data_len: size,
                };
                return Ok((header, body));
            }
            _ => {}
        }

        // Chunks are word aligned
        let padded = size as usize + (size as usize & 1);
        offset = match body.checked_add(padded) {
            Some(next) => next,
            None => break,
        };
    }

    if fmt.is_none() {
        Err(invalid("no fmt chunk found"))
    } else {
        Err(invalid("no data chunk found"))
    }
}

/// Quick validity check for a WAV container
pub fn is_valid_wav(bytes: &[u8]) -> bool {
    probe_header(bytes).is_ok()
}

/// Decode WAV bytes into an `AudioBuffer`
///
/// # Errors
/// * `InvalidFormat` - if the container check fails or the samples are float
/// * `DecodeFailure` - if the sample data is corrupt or truncated
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer> {
    let (header, data_offset) = locate_data(bytes)?;

    let partial = header.partial_frame_len();
    if partial == 0 {
        return read_samples(bytes, &header);
    }

    // hound only accepts whole frames: hand it a copy that ends after the
    // last whole frame and keep the leftover bytes for re-encoding
    let whole = header.data_len as usize - partial;
    let tail_start = (data_offset + whole).min(bytes.len());
    let tail_end = (data_offset + header.data_len as usize).min(bytes.len());
    let trailing = bytes[tail_start..tail_end].to_vec();

    let mut trimmed = bytes[..tail_start].to_vec();
    write_u32(&mut trimmed, data_offset - 4, whole as u32);
    let riff_len = (trimmed.len() - CHUNK_HEADER_LEN) as u32;
    write_u32(&mut trimmed, 4, riff_len);

    debug!("Keeping {} bytes of a trailing partial frame", trailing.len());
    Ok(read_samples(&trimmed, &header)?.with_trailing(trailing))
}

fn read_samples(bytes: &[u8], header: &WavHeader) -> Result<AudioBuffer> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        return Err(invalid("IEEE float samples are not supported"));
    }

    debug!(
        "Decoding WAV: {} Hz, {} ch, {}-bit, {} data bytes",
        spec.sample_rate, spec.channels, spec.bits_per_sample, header.data_len
    );

    let samples = reader
        .into_samples::<i32>()
        .collect::<std::result::Result<Vec<i32>, hound::Error>>()
        .map_err(|e| EqualizerError::DecodeFailure {
            reason: e.to_string(),
        })?;

    AudioBuffer::new(samples, spec.sample_rate, spec.channels, spec.bits_per_sample).map_err(
        |e| match e {
            EqualizerError::InvalidFormat { reason } => EqualizerError::DecodeFailure { reason },
            other => other,
        },
    )
}

fn encode_error(err: hound::Error) -> EqualizerError {
    EqualizerError::EncodeFailure {
        reason: err.to_string(),
    }
}

/// Encode an `AudioBuffer` as integer PCM WAV bytes
///
/// The output keeps the buffer's sample rate, channel count and bit depth.
/// Trailing partial-frame bytes are appended to the `data` chunk as-is.
///
/// # Errors
/// * `EncodeFailure` - if hound rejects the format or a sample
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: buffer.bit_depth(),
        sample_format: SampleFormat::Int,
    };

    let bytes_per_sample = (buffer.bit_depth() as usize + 7) / 8;
    let mut cursor = Cursor::new(Vec::with_capacity(
        RIFF_HEADER_LEN + 64 + buffer.len() * bytes_per_sample,
    ));

    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(encode_error)?;
        for &sample in buffer.samples() {
            writer.write_sample(sample).map_err(encode_error)?;
        }
        writer.finalize().map_err(encode_error)?;
    }

    let mut bytes = cursor.into_inner();
    if !buffer.trailing().is_empty() {
        append_trailing(&mut bytes, buffer.trailing())?;
    }
    Ok(bytes)
}

/// Extend the final `data` chunk with raw bytes, fixing up the chunk and
/// RIFF lengths
fn append_trailing(bytes: &mut Vec<u8>, trailing: &[u8]) -> Result<()> {
    let (header, data_offset) = locate_data(bytes).map_err(|e| {
        EqualizerError::EncodeFailure {
            reason: e.to_string(),
        }
    })?;
    let data_len = header.data_len as usize + trailing.len();

    bytes.truncate(data_offset + header.data_len as usize);
    bytes.extend_from_slice(trailing);
    if data_len % 2 == 1 {
        bytes.push(0);
    }

    let data_len = u32::try_from(data_len).map_err(|_| EqualizerError::EncodeFailure {
        reason: "data chunk exceeds 4 GiB".to_string(),
    })?;
    write_u32(bytes, data_offset - 4, data_len);
    let riff_len = (bytes.len() - CHUNK_HEADER_LEN) as u32;
    write_u32(bytes, 4, riff_len);
    Ok(())
}
