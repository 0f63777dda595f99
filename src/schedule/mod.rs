//! # Schedule Generator
//!
//! Consumes a merged sample/pKa table and emits SiriusT3 import files,
//! applying tray-capacity batching and protocol-specific line templates.
//!
//! Each import file holds three fixed-order sections: a literal header
//! marker, one sample line per tray slot, a `TRAY,{name}` line, and the
//! protocol's experiment command lines.

mod generator;
mod protocols;
mod table;

pub use generator::{GeneratorConfig, ScheduleGenerator};
pub use protocols::{LogpSolvent, Protocol};
pub use table::{
    convert_long_pkas, load_pka_table, merge_registry_pkas, MergeOptions, ScheduleRow,
    ScheduleTable,
};

use std::path::PathBuf;

/// Errors for schedule table loading, merging, and file generation. All of
/// these are batch-level: they abort the run rather than dropping rows.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// A required column is absent from an input table
    #[error("column {column:?} not found in {file}")]
    MissingColumn {
        /// The missing column name
        column: String,
        /// The file it was expected in
        file: String,
    },

    /// Rows reached the generator with no pKa string
    #[error("input has {count} rows with missing estimated pKas: {samples:?}")]
    MissingPkas {
        /// Number of offending rows
        count: usize,
        /// Their sample identifiers
        samples: Vec<String>,
    },

    /// A mass-dosing protocol found a sample without a required value
    #[error("sample {sample:?} is missing a value for {column:?}")]
    MissingValue {
        /// The sample missing data
        sample: String,
        /// The required column
        column: String,
    },

    /// The logP protocol was selected without a partition solvent
    #[error("the logP protocol requires a partition solvent")]
    MissingSolvent,

    /// The output directory already exists; refusing to overwrite
    #[error("output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// I/O error reading inputs or writing import files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error reading an input table
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
