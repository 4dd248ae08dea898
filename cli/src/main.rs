//! active-positions: replay editing sessions and print the hottest lines.

use std::path::PathBuf;

use active_positions::TrackerConfig;
use active_positions_cli::{Session, render_table, replay};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "active-positions")]
#[command(about = "Track cursor dwell and rank recently active lines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted session and print the ranked positions
    Replay {
        /// Session file (JSON)
        session: PathBuf,

        /// Tracker config file (JSON); overrides the session's config
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default tracker config as JSON
    DefaultConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            session,
            config,
            json,
        } => {
            let session = Session::load(&session)?;
            let config = config
                .map(|path| {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read config {}", path.display()))?;
                    TrackerConfig::from_json(&raw)
                        .with_context(|| format!("invalid config {}", path.display()))
                })
                .transpose()?;

            let outcome = replay(&session, config, Utc::now())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", render_table(&outcome.items));
            }
        }
        Commands::DefaultConfig => {
            let json = serde_json::to_string_pretty(&TrackerConfig::default())?;
            println!("{json}");
        }
    }

    Ok(())
}
