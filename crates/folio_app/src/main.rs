//! Folio CLI
//!
//! Run the portfolio page headlessly and validate configuration.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use folio_app::{runner, FolioConfig, PortfolioApp, Scenario};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Folio portfolio animation host", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the page through a scenario and print a JSON report
    Run {
        /// Configuration file or directory containing folio.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scenario JSON; without one the page runs until it is ready
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Force the reduced-motion preference
        #[arg(long)]
        reduced_motion: bool,

        /// Frames to run when no scenario is given
        #[arg(long)]
        frames: Option<u32>,

        /// Also write the report to this (relative) path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file and print it with defaults filled in
    CheckConfig {
        /// Configuration file or directory containing folio.toml
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Run {
            config: Some(path), ..
        } => Some(FolioConfig::load(path)?),
        Commands::Run { config: None, .. } => Some(FolioConfig::default()),
        Commands::CheckConfig { .. } => None,
    };

    // RUST_LOG wins, then --verbose, then the configured level
    let fallback = if cli.verbose {
        "debug".to_string()
    } else {
        config
            .as_ref()
            .map(|c| c.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            reduced_motion,
            frames,
            output,
            ..
        } => {
            let config = config.unwrap_or_default();
            cmd_run(config, scenario.as_deref(), reduced_motion, frames, output.as_deref())
        }
        Commands::CheckConfig { path } => cmd_check_config(&path),
    }
}

fn cmd_run(
    mut config: FolioConfig,
    scenario: Option<&Path>,
    reduced_motion: bool,
    frames: Option<u32>,
    output: Option<&Path>,
) -> Result<()> {
    if reduced_motion {
        config.motion.reduced = true;
    }
    if scenario.is_some() && frames.is_some() {
        bail!("--frames only applies when no --scenario is given");
    }

    let mut app = PortfolioApp::new(config)?;
    let report = match scenario {
        Some(path) => {
            let scenario = Scenario::from_path(path)?;
            info!("Running {} steps from {}", scenario.steps.len(), path.display());
            runner::run_loaded_scenario(&mut app, &scenario)?
        }
        None => {
            let frames = frames.unwrap_or_else(|| runner::frames_until_ready(&app));
            info!("Running {} frames", frames);
            runner::run_frames(&mut app, frames)?
        }
    };
    app.shutdown();

    report.write_to_writer(&mut std::io::stdout().lock())?;
    if let Some(path) = output {
        report.write_to_path(path)?;
        info!("Report written to {}", path.display());
    }

    if report.is_failed() {
        bail!(
            "scenario failed at step {}: {}",
            report.failed_step_index.unwrap_or_default(),
            report.message.as_deref().unwrap_or("unknown failure")
        );
    }
    Ok(())
}

fn cmd_check_config(path: &Path) -> Result<()> {
    let config = FolioConfig::load(path)?;
    info!(
        "Configuration OK: {}x{} at {} fps, preloader {:.2}s",
        config.viewport.width,
        config.viewport.height,
        config.clock.fps,
        config.bootstrap_config()?.total_duration()
    );
    print!("{}", config.to_toml()?);
    Ok(())
}
