//! Flat-directory file stores
//!
//! Uploaded originals and processed outputs each live in their own
//! directory, addressed by filename. Client-supplied names are reduced to
//! a bare basename before they touch the filesystem.
//!
//! There is no locking: two requests writing the same name race at the
//! filesystem and the last writer wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::error::{EqualizerError, Result};

/// Prefix for processed outputs
pub const PROCESSED_PREFIX: &str = "processed_";

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn invalid_name(name: &str, reason: &str) -> EqualizerError {
    EqualizerError::InvalidFilename {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Reduce a client-supplied filename to a safe basename
///
/// Directory parts (`/` or `\`) are stripped. Any `..` component is
/// rejected outright rather than stripped, as are control characters and
/// names that end up empty.
pub fn sanitize_filename(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(invalid_name(raw, "filename is empty"));
    }
    if raw.chars().any(char::is_control) {
        return Err(invalid_name(raw, "filename contains control characters"));
    }

    let mut components = raw.split(is_separator);
    if components.any(|c| c == "..") {
        return Err(invalid_name(raw, "path traversal is not allowed"));
    }

    let base = raw.rsplit(is_separator).next().unwrap_or_default();
    if base.trim().is_empty() || base == "." {
        return Err(invalid_name(raw, "filename has no basename"));
    }

    Ok(base.to_string())
}

/// Name under which the processed variant of `name` is stored
pub fn processed_name(name: &str) -> String {
    format!("{}{}", PROCESSED_PREFIX, name)
}

/// Hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// A file written to a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Sanitized filename within the store
    pub name: String,
    /// Full path on disk
    pub path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// Hex SHA-256 of the contents
    pub sha256: String,
}

/// A flat directory of named files
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory backing the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the backing directory if it does not exist
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Path for a name, after sanitizing it
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(sanitize_filename(name)?))
    }

    /// Write `bytes` under `name`, replacing any existing file
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let name = sanitize_filename(name)?;
        let path = self.root.join(&name);
        fs::write(&path, bytes).await?;

        let stored = StoredFile {
            name,
            path,
            size_bytes: bytes.len() as u64,
            sha256: sha256_hex(bytes),
        };
        debug!(
            "Stored {} ({} bytes, sha256 {})",
            stored.path.display(),
            stored.size_bytes,
            stored.sha256
        );
        Ok(stored)
    }

    /// Read the file stored under `name`
    ///
    /// # Errors
    /// * `NotFound` - if nothing is stored under that name
    pub async fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => EqualizerError::NotFound {
                name: name.to_string(),
            },
            _ => EqualizerError::Io(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("song.wav", "song.wav" ; "plain")]
    #[test_case("my song (final).wav", "my song (final).wav" ; "spaces")]
    #[test_case("dir/song.wav", "song.wav" ; "unix directory")]
    #[test_case("C:\\Users\\me\\song.wav", "song.wav" ; "windows directory")]
    #[test_case("/etc/passwd", "passwd" ; "absolute path")]
    #[test_case("..song.wav", "..song.wav" ; "dots inside name")]
    fn test_sanitize_accepts(raw: &str, expected: &str) {
        assert_eq!(sanitize_filename(raw).unwrap(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case(".." ; "parent")]
    #[test_case("../secret.wav" ; "unix traversal")]
    #[test_case("a/../../b.wav" ; "nested traversal")]
    #[test_case("..\\b.wav" ; "windows traversal")]
    #[test_case("dir/" ; "trailing separator")]
    #[test_case("." ; "current dir")]
    #[test_case("bad\0name.wav" ; "nul byte")]
    #[test_case("line\nbreak.wav" ; "newline")]
    fn test_sanitize_rejects(raw: &str) {
        let err = sanitize_filename(raw).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FILENAME");
    }

    #[test]
    fn test_processed_name() {
        assert_eq!(processed_name("song.wav"), "processed_song.wav");
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let stored = store.write("song.wav", b"RIFF....").await.unwrap();
        assert_eq!(stored.name, "song.wav");
        assert_eq!(stored.size_bytes, 8);
        assert_eq!(stored.path, dir.path().join("song.wav"));
        assert!(store.path_for("song.wav").unwrap().exists());

        assert_eq!(store.read("song.wav").await.unwrap(), b"RIFF....");
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.write("a.wav", b"first").await.unwrap();
        store.write("a.wav", b"second").await.unwrap();
        assert_eq!(store.read("a.wav").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_write_strips_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("store"));
        store.ensure_dir().unwrap();

        let stored = store.write("nested/dir/a.wav", b"x").await.unwrap();
        assert_eq!(stored.path, dir.path().join("store").join("a.wav"));
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.read("missing.wav").await.unwrap_err();
        assert!(matches!(err, EqualizerError::NotFound { .. }));
        assert!(!store.path_for("missing.wav").unwrap().exists());
    }

    #[tokio::test]
    async fn test_traversal_never_touches_disk() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("store"));
        store.ensure_dir().unwrap();

        let err = store.write("../escape.wav", b"x").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FILENAME");
        assert!(!dir.path().join("escape.wav").exists());
    }
}
