//! WAV Equalizer CLI
//!
//! Runs the HTTP server, or processes and inspects files offline.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use wav_equalizer::cli::{commands, init_logging, Cli, Commands};
use wav_equalizer::dsp::GainSettings;
use wav_equalizer::EqualizerError;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("WAV Equalizer v{}", env!("CARGO_PKG_VERSION"));

    let command = cli.command.unwrap_or_default();
    let label = command_label(&command);
    handle_command(command)
        .map_err(|e| {
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            e
        })
        .with_context(|| format!("{} failed", label))
}

fn command_label(cmd: &Commands) -> &'static str {
    match cmd {
        Commands::Serve(_) => "serve",
        Commands::Process { .. } => "process",
        Commands::Info { .. } => "info",
    }
}

fn handle_command(cmd: Commands) -> Result<(), EqualizerError> {
    match cmd {
        Commands::Serve(args) => commands::serve(args.into_config()?),
        Commands::Process {
            input,
            output,
            bass,
            mid,
            treble,
        } => commands::process(
            &input,
            &output,
            &GainSettings::from_percentages(bass, mid, treble),
        ),
        Commands::Info { file, json } => commands::info(&file, json),
    }
}
