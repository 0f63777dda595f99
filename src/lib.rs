//! # t3chomp - SiriusT3 Result Extraction and Schedule Generation
//!
//! `t3chomp` converts between the three data representations used in a
//! laboratory pKa/logP measurement workflow built around the Pion SiriusT3
//! titration instrument:
//!
//! - **`.t3r` result files**: instrument-produced XML documents, one per
//!   assay run, with irregular and protocol-dependent nesting.
//! - **CSV registries**: flat tables of sample metadata (registry numbers,
//!   batch names, wells, molecular weights) and estimated pKas.
//! - **Schedule import files**: the strict positional CSV dialect the
//!   instrument consumes to load sample trays.
//!
//! ## Extraction
//!
//! ```rust,no_run
//! use t3chomp::batch::BatchExtractor;
//!
//! let extractor = BatchExtractor::new("results_dir")?;
//! let set = extractor.extract_pka();
//! println!("{} rows, {} failed files", set.num_succeeded(), set.num_failed());
//! set.write_results_csv("results.csv")?;
//! # Ok::<(), t3chomp::batch::BatchError>(())
//! ```
//!
//! A single malformed file never aborts a batch: its name and failure
//! reason are recorded in the result set and extraction continues.
//!
//! ## Schedule generation
//!
//! ```rust,no_run
//! use t3chomp::schedule::{
//!     merge_registry_pkas, GeneratorConfig, MergeOptions, Protocol, ScheduleGenerator,
//! };
//!
//! let table = merge_registry_pkas("registry.csv", "pkas.csv", &MergeOptions::default())?;
//! let generator = ScheduleGenerator::new(table, GeneratorConfig::new(Protocol::UvMetricPska))?;
//! generator.write_files("trays")?;
//! # Ok::<(), t3chomp::schedule::ScheduleError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`t3r`]: the result document model — generic XML tree plus typed
//!   pKa/logP document wrappers.
//! - [`batch`]: the result-set aggregator with per-file failure isolation
//!   and CSV output.
//! - [`schedule`]: table loading, the registry/pKa merge, tray batching,
//!   and protocol-specific import file generation.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod schedule;
pub mod t3r;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::batch::{BatchError, BatchExtractor, FailedFile, LogpRow, PkaRow, ResultSet};
    pub use crate::schedule::{
        merge_registry_pkas, GeneratorConfig, LogpSolvent, MergeOptions, Protocol, ScheduleError,
        ScheduleGenerator, ScheduleRow, ScheduleTable,
    };
    pub use crate::t3r::{
        AssayCategory, LogPMeasurement, LogpResultFile, PkaMeasurement, PkaResultFile, PkaType,
        ResultFile, T3rError,
    };
}
