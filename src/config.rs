//! Server configuration
//!
//! Directory locations, upload ceiling and listen address. Loaded from an
//! optional JSON file; any field left out takes its default.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EqualizerError, Result};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Default upload ceiling (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default directory for original uploads
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Default directory for processed outputs
pub const DEFAULT_PROCESSED_DIR: &str = "./processed";

/// Configuration handed to the HTTP surface at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: u16,
    /// Store for original uploads
    pub upload_dir: PathBuf,
    /// Store for processed outputs
    pub processed_dir: PathBuf,
    /// Maximum accepted request body for uploads, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Config rooted at a single directory, with `uploads/` and
    /// `processed/` beneath it
    pub fn with_root(root: &Path) -> Self {
        Self {
            upload_dir: root.join("uploads"),
            processed_dir: root.join("processed"),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| EqualizerError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| EqualizerError::Config {
            reason: format!("cannot parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(EqualizerError::Config {
                reason: "max_upload_bytes must be positive".to_string(),
            });
        }
        if self.upload_dir == self.processed_dir {
            return Err(EqualizerError::Config {
                reason: "upload_dir and processed_dir must differ".to_string(),
            });
        }
        Ok(())
    }

    /// Address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.processed_dir, PathBuf::from("./processed"));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "port": 9000, "upload_dir": "/srv/in" }"#).unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/in"));
        assert_eq!(config.processed_dir, PathBuf::from(DEFAULT_PROCESSED_DIR));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = TempDir::new().unwrap();
        let missing = ServerConfig::from_file(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(EqualizerError::Config { .. })));

        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ServerConfig::from_file(&path).is_err());

        fs::write(&path, r#"{ "max_upload_bytes": 0 }"#).unwrap();
        assert!(ServerConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_same_dirs_rejected() {
        let config = ServerConfig {
            processed_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_root() {
        let config = ServerConfig::with_root(Path::new("/tmp/eq"));
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/eq/uploads"));
        assert_eq!(config.processed_dir, PathBuf::from("/tmp/eq/processed"));
    }
}
