//! Error handling for the equalizer
//!
//! One error type covers the codec boundary, the stores and the HTTP
//! surface. Each variant knows its stable code and the status it maps to.

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for equalizer operations
pub type Result<T> = std::result::Result<T, EqualizerError>;

/// Main error type for equalizer operations
#[derive(Error, Debug)]
pub enum EqualizerError {
    // Codec Errors
    #[error("Not a valid WAV file: {reason}")]
    InvalidFormat { reason: String },

    #[error("Error decoding WAV: {reason}")]
    DecodeFailure { reason: String },

    #[error("Error encoding WAV: {reason}")]
    EncodeFailure { reason: String },

    // Request Errors
    #[error("Invalid {field} value: '{value}'")]
    InvalidParameter { field: String, value: String },

    #[error("Missing form field: {field}")]
    MissingField { field: String },

    #[error("Invalid filename '{name}': {reason}")]
    InvalidFilename { name: String, reason: String },

    #[error("File too large (limit is {limit_bytes} bytes)")]
    PayloadTooLarge { limit_bytes: usize },

    #[error("Bad request: {reason}")]
    BadRequest { reason: String },

    #[error("Method not allowed")]
    MethodNotAllowed,

    // Store Errors
    #[error("File not found: {name}")]
    NotFound { name: String },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Internal error: {reason}")]
    Internal { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EqualizerError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EqualizerError::InvalidFormat { .. } => "INVALID_FORMAT",
            EqualizerError::DecodeFailure { .. } => "DECODE_FAILURE",
            EqualizerError::EncodeFailure { .. } => "ENCODE_FAILURE",
            EqualizerError::InvalidParameter { .. } => "INVALID_PARAMETER",
            EqualizerError::MissingField { .. } => "MISSING_FIELD",
            EqualizerError::InvalidFilename { .. } => "INVALID_FILENAME",
            EqualizerError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            EqualizerError::BadRequest { .. } => "BAD_REQUEST",
            EqualizerError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            EqualizerError::NotFound { .. } => "NOT_FOUND",
            EqualizerError::Config { .. } => "CONFIG_ERROR",
            EqualizerError::Internal { .. } => "INTERNAL_ERROR",
            EqualizerError::Io(_) => "IO_ERROR",
        }
    }

    /// HTTP status this error is reported with
    ///
    /// Oversized uploads are reported as 400, matching the other
    /// malformed-upload cases.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EqualizerError::InvalidParameter { .. }
            | EqualizerError::MissingField { .. }
            | EqualizerError::InvalidFilename { .. }
            | EqualizerError::PayloadTooLarge { .. }
            | EqualizerError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            EqualizerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            EqualizerError::NotFound { .. } => StatusCode::NOT_FOUND,
            EqualizerError::InvalidFormat { .. }
            | EqualizerError::DecodeFailure { .. }
            | EqualizerError::EncodeFailure { .. }
            | EqualizerError::Config { .. }
            | EqualizerError::Internal { .. }
            | EqualizerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if the caller caused this error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            EqualizerError::InvalidFormat { .. } => vec![
                "Only uncompressed integer PCM WAV files are supported",
                "Try re-exporting the file as 16-bit PCM WAV",
            ],
            EqualizerError::DecodeFailure { .. } => vec![
                "The file header looks fine but the sample data is damaged",
                "Re-export the file from its source",
            ],
            EqualizerError::NotFound { .. } => vec![
                "Upload the file before processing it",
                "Check the filename for typos",
            ],
            EqualizerError::PayloadTooLarge { .. } => vec![
                "Trim the audio or raise the configured upload limit",
            ],
            _ => vec![],
        }
    }
}

impl From<hound::Error> for EqualizerError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => EqualizerError::DecodeFailure {
                reason: e.to_string(),
            },
            hound::Error::FormatError(reason) => EqualizerError::InvalidFormat {
                reason: reason.to_string(),
            },
            hound::Error::Unsupported => EqualizerError::InvalidFormat {
                reason: "unsupported WAV variant".to_string(),
            },
            other => EqualizerError::DecodeFailure {
                reason: other.to_string(),
            },
        }
    }
}
