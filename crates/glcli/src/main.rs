//! gliss - quantized chord analysis from the command line
//!
//! Subcommands:
//! - `gliss grid` - Describe the frequency grid
//! - `gliss notes <FREQ>...` - Name frequencies
//! - `gliss roughness <FREQ>...` - Vassilakis roughness of a frequency set
//! - `gliss overtone <FREQ>...` - Nearest overtone chord
//! - `gliss fm <FREQ>...` - Nearest carrier/modulator sideband chords
//! - `gliss inharmonic <FREQ>...` - Greedy inharmonic chord search
//! - `gliss config` - Print the effective configuration
//!
//! Frequencies may be given in Hz (`261.63`) or as note names (`C4`, `E4b`, `F4+`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glissconf::GlissConfig;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "gliss")]
#[command(about = "Quantized chord analysis: overtone and FM chord search, roughness")]
#[command(version)]
struct Cli {
    /// Config file to load instead of ./gliss.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Grid divisions per octave (overrides config)
    #[arg(long, global = true)]
    divisions: Option<u32>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the frequency grid
    Grid,

    /// Name each frequency at the grid's resolution
    Notes {
        /// Frequencies in Hz or note names
        #[arg(required = true, value_parser = commands::parse_pitch)]
        freqs: Vec<f64>,
    },

    /// Total roughness of a frequency set
    Roughness {
        /// Frequencies in Hz or note names
        #[arg(required = true, value_parser = commands::parse_pitch)]
        freqs: Vec<f64>,
    },

    /// Nearest overtone chord by subharmonic search
    Overtone {
        /// Frequencies in Hz or note names
        #[arg(required = true, value_parser = commands::parse_pitch)]
        freqs: Vec<f64>,

        /// Subharmonics tried per note (default from config)
        #[arg(short, long)]
        max_sub: Option<u32>,

        /// Prefer the lowest fundamental among equal scores
        #[arg(long)]
        lowest: bool,
    },

    /// Nearest carrier/modulator sideband chords
    Fm {
        /// Frequencies in Hz or note names
        #[arg(required = true, value_parser = commands::parse_pitch)]
        freqs: Vec<f64>,

        /// Sidebands per side to match against (default: all tabulated)
        #[arg(short, long)]
        sidebands: Option<usize>,

        /// Maximum number of solutions to print
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Greedy inharmonic chord search over chord-note carriers
    Inharmonic {
        /// Frequencies in Hz or note names
        #[arg(required = true, value_parser = commands::parse_pitch)]
        freqs: Vec<f64>,

        /// Use the average half-interval as carrier instead of chord notes
        #[arg(long)]
        avg_carrier: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = GlissConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(divisions) = cli.divisions {
        config.grid.divisions = divisions;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.telemetry.log_level)),
        )
        .init();

    tracing::debug!(
        files = ?sources.files,
        env = ?sources.env_overrides,
        "configuration loaded"
    );

    let out = commands::Output { json: cli.json };

    match cli.command {
        Commands::Grid => commands::grid(&config, out)?,
        Commands::Notes { freqs } => commands::notes(&config, &freqs, out)?,
        Commands::Roughness { freqs } => commands::roughness(&config, &freqs, out)?,
        Commands::Overtone {
            freqs,
            max_sub,
            lowest,
        } => {
            commands::overtone(&config, &freqs, max_sub, lowest, out)?;
        }
        Commands::Fm {
            freqs,
            sidebands,
            limit,
        } => {
            commands::fm(&config, &freqs, sidebands, limit, out)?;
        }
        Commands::Inharmonic { freqs, avg_carrier } => {
            commands::inharmonic(&config, &freqs, avg_carrier, out)?;
        }
        Commands::Config => commands::show_config(&config, &sources),
    }

    Ok(())
}
