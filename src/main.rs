//! # t3chomp CLI
//!
//! Command-line tool for the SiriusT3 pKa/logP workflow.
//!
//! ## Usage
//!
//! ```bash
//! # Extract a directory of pKa result files into a CSV table
//! t3chomp extract results_dir/ --protocol pka --output results.csv
//!
//! # Generate tray import files from a registry and estimated pKas
//! t3chomp gencsv --regi registry.csv --pka pkas.csv \
//!     --output trays --protocol uv-metric-pska
//!
//! # Summarize a single result file
//! t3chomp info sample.t3r
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Extract {
            path,
            protocol,
            output,
        } => cli::extract::run(path, protocol.into(), output),
        Commands::Gencsv {
            regi,
            pka,
            filter_file,
            sample_col,
            output,
            protocol,
            concentration,
            volume,
            logp_solvent,
        } => cli::gencsv::run(
            regi,
            pka,
            filter_file,
            sample_col,
            output,
            protocol,
            concentration,
            volume,
            logp_solvent,
        ),
        Commands::Info { file } => cli::info::run(file),
    }
}
