//! rebase: swap the bases of a printed storage module.
//!
//! Detects the square base footprints under a module, works out which
//! way up it is, and cuts in the base from a reference module using
//! OpenSCAD.
//!
//! # Logging
//!
//! Set `RUST_LOG` to control log output, or use `-v`:
//! - `RUST_LOG=rebase_detect=debug` - every orientation score
//! - `RUST_LOG=rebase_scad=info` - evaluator runs
//!
//! # Example
//!
//! ```bash
//! # Which way up is it, and where are the bases?
//! rebase detect bin.stl
//!
//! # Write the cut script only
//! rebase script bin.stl gold.stl -o fix.scad
//!
//! # Full run through a local openscad
//! rebase run bin.stl gold.stl -o fixed.stl
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{detect, run, script};
use config::RebaseConfig;

/// rebase - replace the bases of a printed storage module.
#[derive(Parser)]
#[command(name = "rebase")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with [detect], [script] and [evaluator] settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect bases and the orientation that puts them underneath
    Detect {
        /// Input STL file
        input: PathBuf,

        /// Also write the mesh rotated into the detected orientation
        #[arg(long)]
        write_oriented: Option<PathBuf>,
    },

    /// Generate the OpenSCAD cut script
    Script {
        /// Module whose bases are replaced
        to_fix: PathBuf,

        /// Module providing the replacement base
        gold: PathBuf,

        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the script and evaluate it with OpenSCAD
    Run {
        /// Module whose bases are replaced
        to_fix: PathBuf,

        /// Module providing the replacement base
        gold: PathBuf,

        /// Output STL file
        #[arg(short, long)]
        output: PathBuf,

        /// OpenSCAD binary to run
        #[arg(long)]
        openscad: Option<PathBuf>,

        /// Also save the generated script
        #[arg(long)]
        keep_script: Option<PathBuf>,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "rebase_detect=info,rebase_scad=info,rebase_mesh=info",
            2 => "rebase_detect=debug,rebase_scad=debug,rebase_mesh=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match RebaseConfig::load(cli.config.as_deref()) {
        Ok(config) => dispatch(&cli, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {cause}");
            }
        }
        std::process::exit(1);
    }
}

async fn dispatch(cli: &Cli, config: RebaseConfig) -> Result<()> {
    match &cli.command {
        Commands::Detect {
            input,
            write_oriented,
        } => detect::run(input, write_oriented.as_deref(), &config, cli),
        Commands::Script {
            to_fix,
            gold,
            output,
        } => script::run(to_fix, gold, output.as_deref(), &config, cli),
        Commands::Run {
            to_fix,
            gold,
            output,
            openscad,
            keep_script,
        } => {
            let mut config = config;
            if let Some(binary) = openscad {
                config.evaluator.binary = binary.clone();
            }
            run::run(to_fix, gold, output, keep_script.as_deref(), &config, cli).await
        }
    }
}
