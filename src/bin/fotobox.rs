use std::{
    path::PathBuf,
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fotobox::{Booth, BoothConfig, BoothError, CameraChoice};

#[derive(Parser, Debug)]
#[command(name = "fotobox", version)]
struct Cli {
    /// Booth configuration JSON.
    #[arg(long, default_value = "fotobox.json")]
    config: PathBuf,

    /// Substitute placeholder images for real camera captures.
    #[arg(long)]
    dry_run: bool,

    /// Override the configured pictures-per-session count.
    #[arg(long)]
    pictures: Option<u32>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one full cycle: capture, merge, upload, cleanup.
    Run,
    /// Wait for the hardware button and run cycles until interrupted.
    Attend,
    /// Merge the images already in the working directory (no upload, no cleanup).
    Merge,
    /// Delete working-directory and output-directory files.
    Clean,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(BoothError::Interrupted) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), BoothError> {
    let mut cfg = BoothConfig::load(&cli.config)?;
    if cli.dry_run {
        cfg.camera = CameraChoice::DryRun;
    }
    if let Some(pictures) = cli.pictures {
        cfg.pictures = pictures;
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("install interrupt handler")?;
    }

    let mut booth = Booth::new(cfg, stop)?;
    match cli.cmd {
        Command::Run => {
            booth.cleanup()?;
            booth.run_once()
        }
        Command::Attend => {
            booth.cleanup()?;
            booth.attend()
        }
        Command::Merge => booth.merge_only(),
        Command::Clean => booth.cleanup(),
    }
}
