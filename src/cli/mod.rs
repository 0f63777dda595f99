use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use t3chomp::schedule::{LogpSolvent, Protocol};
use t3chomp::t3r::AssayCategory;

pub mod extract;
pub mod gencsv;
pub mod info;

/// t3chomp - SiriusT3 result extraction and schedule generation
#[derive(Parser)]
#[command(name = "t3chomp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Assay protocol of the input result files.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AssayArg {
    /// pKa assay result files
    Pka,
    /// logP assay result files
    Logp,
}

impl From<AssayArg> for AssayCategory {
    fn from(arg: AssayArg) -> Self {
        match arg {
            AssayArg::Pka => AssayCategory::Pka,
            AssayArg::Logp => AssayCategory::Logp,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract results from .t3r files into a CSV table
    Extract {
        /// A .t3r file or a directory of .t3r files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Assay protocol of the input files
        #[arg(long, value_enum)]
        protocol: AssayArg,

        /// Output CSV path; a failed_filenames.csv is written beside it.
        /// Results go to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate SiriusT3 import files from a registry and a pKa table
    Gencsv {
        /// Registration CSV file with sample information
        #[arg(long)]
        regi: PathBuf,

        /// CSV file with estimated pKas (short or long format)
        #[arg(long)]
        pka: PathBuf,

        /// File limiting entries from the regi file; only samples listed in
        /// it are scheduled
        #[arg(long)]
        filter_file: Option<PathBuf>,

        /// Name of the registry column used to join against the pKa table
        #[arg(long, default_value = "ID")]
        sample_col: String,

        /// Output directory (must not already exist)
        #[arg(long)]
        output: PathBuf,

        /// Scheduling protocol
        #[arg(long, value_enum)]
        protocol: Protocol,

        /// Sample concentration in mM
        #[arg(long, default_value = "10.0")]
        concentration: f64,

        /// Sample volume in µL
        #[arg(long, default_value = "5.0")]
        volume: f64,

        /// Partition solvent (required when --protocol is logp)
        #[arg(long, value_enum)]
        logp_solvent: Option<LogpSolvent>,
    },

    /// Summarize a single .t3r result file
    Info {
        /// Input .t3r file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
