//! Bracket CLI
//!
//! Statistics JSON → most-likely bracket, layout geometry, match lookups

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use bracket_core::reconstruct::{EvidencePolicy, SolverPolicy};
#[cfg(feature = "cli")]
use bracket_core::round::TeamId;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "bracket")]
#[command(about = "Reconstruct and lay out knockout brackets from simulation statistics", long_about = None)]
struct Cli {
    /// Combined settings file (layout, reconstruction, matchNumbers sections)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Reconstruct the most likely consistent bracket
    Reconstruct {
        /// Statistics JSON file
        #[arg(long)]
        stats: PathBuf,

        /// Round-of-32 solver (optimal, greedy)
        #[arg(long)]
        solver: Option<String>,

        /// Evidence policy (wins_then_participation, wins_only, participation_only)
        #[arg(long)]
        evidence: Option<String>,

        /// Reconstruction config file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compute bracket layout geometry
    Layout {
        /// Layout config file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset (default, compact, spacious); ignored with --config
        #[arg(long)]
        preset: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Look up the bracket slot of an official match number
    Lookup {
        /// Match number (e.g. 74)
        match_number: u16,

        /// Match table file (JSON or YAML)
        #[arg(long)]
        table: Option<PathBuf>,
    },

    /// Most frequent opponent paths of one team
    Paths {
        /// Statistics JSON file
        #[arg(long)]
        stats: PathBuf,

        /// Team id
        #[arg(long)]
        team: u16,

        /// Number of paths to show
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Team rankings and headline outcomes
    Summary {
        /// Statistics JSON file
        #[arg(long)]
        stats: PathBuf,

        /// Number of teams to list
        #[arg(long, default_value = "16")]
        top: usize,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = bracket_cli::load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Reconstruct { stats, solver, evidence, config, out } => {
            let mut reconstruction = match config {
                Some(path) => bracket_cli::load_reconstruction_config(Some(path.as_path()))?,
                None => settings.reconstruction,
            };
            if let Some(name) = solver {
                reconstruction.solver =
                    SolverPolicy::from_name(&name).with_context(|| format!("Unknown solver: {}", name))?;
            }
            if let Some(name) = evidence {
                reconstruction.evidence =
                    EvidencePolicy::from_name(&name).with_context(|| format!("Unknown evidence policy: {}", name))?;
            }

            let stats = bracket_cli::load_statistics(&stats)?;
            let bracket = bracket_cli::run_reconstruct(&stats, reconstruction)?;
            bracket_cli::write_json(&bracket, out.as_deref())?;
        }

        Commands::Layout { config, preset, out } => {
            let layout = match (config, preset) {
                (Some(path), _) => bracket_cli::load_layout_config(Some(path.as_path()))?,
                (None, Some(name)) => bracket_core::LayoutConfig::from_preset(&name)
                    .with_context(|| format!("Unknown layout preset: {}", name))?,
                (None, None) => settings.layout,
            };
            let geometry = bracket_cli::run_layout(&layout)?;
            bracket_cli::write_json(&geometry, out.as_deref())?;
        }

        Commands::Lookup { match_number, table } => {
            let table = match table {
                Some(path) => bracket_cli::load_match_table(&path)?,
                None => settings.match_numbers,
            };
            let report = bracket_cli::run_lookup(match_number, table)?;
            bracket_cli::write_json(&report, None)?;
        }

        Commands::Paths { stats, team, top } => {
            let stats = bracket_cli::load_statistics(&stats)?;
            let report = bracket_cli::run_paths(&stats, TeamId(team), top);
            bracket_cli::write_json(&report, None)?;
        }

        Commands::Summary { stats, top } => {
            let stats = bracket_cli::load_statistics(&stats)?;
            let report = bracket_cli::run_summary(&stats, top);
            bracket_cli::write_json(&report, None)?;
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("bracket CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
