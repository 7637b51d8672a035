//! CLI Module
//!
//! Command-line interface for the equalizer server and offline processing.

pub mod commands;

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::error::Result;

/// WAV Equalizer - upload a WAV, set three gain sliders, download the result
#[derive(Parser, Debug)]
#[command(name = "wav-equalizer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Apply the equalizer to a WAV file without the server
    #[command(name = "process")]
    Process {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// Bass gain in percent
        #[arg(long, default_value_t = 100, allow_hyphen_values = true)]
        bass: i64,

        /// Mid gain in percent
        #[arg(long, default_value_t = 100, allow_hyphen_values = true)]
        mid: i64,

        /// Treble gain in percent
        #[arg(long, default_value_t = 100, allow_hyphen_values = true)]
        treble: i64,
    },

    /// Print the format of a WAV file
    #[command(name = "info")]
    Info {
        /// WAV file to inspect
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve(ServeArgs::default())
    }
}

/// Server options; flags override the config file
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for uploaded originals
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Directory for processed files
    #[arg(long)]
    pub processed_dir: Option<PathBuf>,

    /// Upload size limit in MiB
    #[arg(long)]
    pub max_upload_mb: Option<usize>,
}

impl ServeArgs {
    /// Resolve the effective server configuration
    pub fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.upload_dir {
            config.upload_dir = dir;
        }
        if let Some(dir) = self.processed_dir {
            config.processed_dir = dir;
        }
        if let Some(mb) = self.max_upload_mb {
            config.max_upload_bytes = mb.saturating_mul(1024 * 1024);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["wav-equalizer"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(Commands::default(), Commands::Serve(_)));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from([
            "wav-equalizer",
            "serve",
            "--port",
            "9090",
            "--upload-dir",
            "/data/in",
            "--max-upload-mb",
            "10",
        ])
        .unwrap();

        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        let config = args.into_config().unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.upload_dir, PathBuf::from("/data/in"));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_process_accepts_negative_gain() {
        let cli = Cli::try_parse_from([
            "wav-equalizer",
            "process",
            "in.wav",
            "out.wav",
            "--bass",
            "-50",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Process {
                bass, mid, treble, ..
            }) => {
                assert_eq!((bass, mid, treble), (-50, 100, 100));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
