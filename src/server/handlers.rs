//! Request handlers
//!
//! Upload stores the multipart file as-is under its sanitized name.
//! Process reads a stored upload, runs the gain pipeline on a blocking
//! thread and stores the result as `processed_<name>`. Both answer with a
//! 303 back to the control page.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::FormRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::dsp::GainSettings;
use crate::engine::process_file;
use crate::error::{EqualizerError, Result};
use crate::server::page::INDEX_HTML;
use crate::server::storage::{processed_name, sanitize_filename};
use crate::server::AppState;

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "audioFile";

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Any method other than POST on `/upload` or `/process`
pub async fn method_not_allowed() -> EqualizerError {
    EqualizerError::MethodNotAllowed
}

/// `POST /upload`
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Redirect> {
    let mut multipart = multipart.map_err(|e| EqualizerError::BadRequest {
        reason: e.body_text(),
    })?;
    let limit = state.config.max_upload_bytes;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) && field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| EqualizerError::BadRequest {
        reason: format!("Error retrieving the file: no '{}' field", UPLOAD_FIELD),
    })?;

    let name = match file_name.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => sanitize_filename(raw)?,
        _ => generated_name(),
    };

    let stored = state.uploads.write(&name, &data).await?;
    info!(
        "Uploaded {} ({} bytes, sha256 {})",
        stored.name, stored.size_bytes, stored.sha256
    );

    redirect_to_file(&stored.name)
}

/// Form fields for `POST /process`
///
/// Everything arrives as text so that a bad number is reported as
/// `InvalidParameter` rather than a generic form rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessForm {
    pub filename: Option<String>,
    pub bass: Option<String>,
    pub mid: Option<String>,
    pub treble: Option<String>,
}

impl ProcessForm {
    /// Parse the three sliders into gain settings
    pub fn gains(&self) -> Result<GainSettings> {
        let bass = parse_percentage("bass", self.bass.as_deref())?;
        let mid = parse_percentage("mid", self.mid.as_deref())?;
        let treble = parse_percentage("treble", self.treble.as_deref())?;
        Ok(GainSettings::from_percentages(bass, mid, treble))
    }
}

/// `POST /process`
pub async fn process(
    State(state): State<AppState>,
    form: std::result::Result<Form<ProcessForm>, FormRejection>,
) -> Result<Redirect> {
    let Form(form) = form.map_err(|e| EqualizerError::BadRequest {
        reason: e.body_text(),
    })?;

    let filename = form.filename.as_deref().unwrap_or_default();
    if filename.is_empty() {
        return Err(EqualizerError::MissingField {
            field: "filename".to_string(),
        });
    }
    let gains = form.gains()?;
    let name = sanitize_filename(filename)?;

    let source = state.uploads.read(&name).await?;
    let output = tokio::task::spawn_blocking(move || process_file(&source, &gains))
        .await
        .map_err(|e| EqualizerError::Internal {
            reason: format!("processing task failed: {}", e),
        })??;

    let stored = state.processed.write(&processed_name(&name), &output).await?;
    info!("Processed {} -> {} with {}", name, stored.name, gains);

    redirect_to_file(&name)
}

/// Parse a slider value as an integer percentage
///
/// No range check: out-of-range and negative values are accepted.
pub fn parse_percentage(field: &str, value: Option<&str>) -> Result<i64> {
    let value = value.ok_or_else(|| EqualizerError::MissingField {
        field: field.to_string(),
    })?;
    value.parse().map_err(|_| EqualizerError::InvalidParameter {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn multipart_error(err: MultipartError, limit: usize) -> EqualizerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        EqualizerError::PayloadTooLarge { limit_bytes: limit }
    } else {
        EqualizerError::BadRequest {
            reason: err.body_text(),
        }
    }
}

/// Server-side name for uploads that arrive without a filename
fn generated_name() -> String {
    format!("upload-{}.wav", Uuid::new_v4())
}

fn redirect_to_file(name: &str) -> Result<Redirect> {
    let query = serde_urlencoded::to_string([("file", name)]).map_err(|e| {
        EqualizerError::Internal {
            reason: e.to_string(),
        }
    })?;
    Ok(Redirect::to(&format!("/?{}", query)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("100", 100)]
    #[test_case("0", 0)]
    #[test_case("250", 250 ; "above slider range")]
    #[test_case("-20", -20 ; "negative")]
    #[test_case("+5", 5 ; "explicit sign")]
    fn test_parse_percentage_accepts(raw: &str, expected: i64) {
        assert_eq!(parse_percentage("bass", Some(raw)).unwrap(), expected);
    }

    #[test_case("abc")]
    #[test_case("")]
    #[test_case("1.5" ; "fractional")]
    #[test_case(" 10" ; "leading space")]
    fn test_parse_percentage_rejects(raw: &str) {
        let err = parse_percentage("mid", Some(raw)).unwrap_err();
        assert!(matches!(
            err,
            EqualizerError::InvalidParameter { ref field, .. } if field == "mid"
        ));
    }

    #[test]
    fn test_parse_percentage_missing() {
        let err = parse_percentage("treble", None).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_form_gains() {
        let form = ProcessForm {
            filename: Some("song.wav".to_string()),
            bass: Some("200".to_string()),
            mid: Some("0".to_string()),
            treble: Some("100".to_string()),
        };
        assert_eq!(form.gains().unwrap(), GainSettings::new(2.0, 0.0, 1.0));
    }

    #[test]
    fn test_generated_name() {
        let name = generated_name();
        assert!(name.starts_with("upload-"));
        assert!(name.ends_with(".wav"));
        assert_eq!(sanitize_filename(&name).unwrap(), name);
    }
}
