//! # Result-Set Aggregator
//!
//! Applies the document model across a batch of .t3r files (a single file or
//! a directory), producing one normalized tabular record set plus a list of
//! per-file failures.
//!
//! Failure isolation: any single file's parse error is caught, recorded with
//! its reason, and the batch continues. A batch where every file fails still
//! returns a (row-less) result set; only batch-level preconditions like an
//! empty input directory are hard errors.

use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde::Serialize;

use crate::t3r::{LogpResultFile, PkaResultFile};

/// Extension the instrument uses for result files.
const RESULT_EXTENSION: &str = "t3r";

/// Errors for batch-level operations. Per-file parse failures are never
/// raised as these; they are recorded in [`ResultSet::failed`].
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The input directory held no result files at all
    #[error("no .{RESULT_EXTENSION} files found in directory: {}", .0.display())]
    NoInputFiles(PathBuf),

    /// I/O error enumerating inputs or writing outputs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error writing result rows
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One file that failed to parse, with the reason it failed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    /// File name of the failed input
    pub filename: String,
    /// Human-readable failure reason
    pub reason: String,
}

/// One normalized row per measured pKa. A document with N pKas yields N rows
/// sharing the sample metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PkaRow {
    /// Sample identifier from the document summary
    pub sample: String,
    /// Source file name
    pub filename: String,
    /// Assay template name
    pub assay_name: String,
    /// Instrument quality grade
    pub assay_quality: String,
    /// 1-based index of this pKa within the document
    pub pka_number: usize,
    /// Acid/base character assigned from the predicted list
    pub pka_type: Option<crate::t3r::PkaType>,
    /// Measured pKa value
    pub pka_value: f64,
    /// Standard deviation or confidence interval
    pub pka_std: Option<f64>,
    /// Average ionic strength
    pub pka_ionic_strength: Option<f64>,
    /// Average temperature
    pub pka_temperature: Option<f64>,
    /// Cosolvent name, when the document records sweeps
    pub cosolvent: Option<String>,
    /// Space-joined cosolvent weight fractions
    pub cosolvent_fractions: Option<String>,
}

/// One normalized row per logP document.
#[derive(Debug, Clone, Serialize)]
pub struct LogpRow {
    /// Source file name
    pub filename: String,
    /// Sample identifier from the document summary
    pub sample: String,
    /// Assay template name
    pub assay_name: String,
    /// Instrument quality grade
    pub assay_quality: String,
    /// Reported logP value
    pub logp: f64,
    /// Fit RMSD
    pub rmsd: f64,
    /// Partition solvent label
    pub solvent: String,
}

/// Ordered rows plus the ordered list of files that failed to parse.
#[derive(Debug, Default)]
pub struct ResultSet<R> {
    /// Normalized rows from every file that parsed
    pub rows: Vec<R>,
    /// Files excluded from the rows, with reasons
    pub failed: Vec<FailedFile>,
}

impl<R: Serialize> ResultSet<R> {
    /// Number of rows extracted.
    pub fn num_succeeded(&self) -> usize {
        self.rows.len()
    }

    /// Number of files that failed to parse.
    pub fn num_failed(&self) -> usize {
        self.failed.len()
    }

    /// Write the result rows as a CSV file.
    pub fn write_results_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), BatchError> {
        if self.rows.is_empty() {
            error!("No parsed results");
        }
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the result rows as a CSV string (for stdout output).
    pub fn results_csv_string(&self) -> Result<String, BatchError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        let bytes = writer
            .into_inner()
            .map_err(|e| BatchError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write the failed-file list as a one-column CSV.
    pub fn write_failed_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), BatchError> {
        if self.failed.is_empty() {
            info!("No files failed to parse");
        }
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        writer.write_record(["failed_filenames"])?;
        for failed in &self.failed {
            writer.write_record([failed.filename.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Extracts result rows from a single .t3r file or a directory of them.
#[derive(Debug)]
pub struct BatchExtractor {
    files: Vec<PathBuf>,
}

impl BatchExtractor {
    /// Enumerate the input. A directory is filtered to `*.t3r` files and
    /// sorted by name so row order is reproducible; an empty directory is a
    /// hard error rather than a silently empty result set.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let files = if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.extension()
                        .map(|ext| ext.eq_ignore_ascii_case(RESULT_EXTENSION))
                        .unwrap_or(false)
                })
                .collect();
            if files.is_empty() {
                return Err(BatchError::NoInputFiles(path.to_path_buf()));
            }
            files.sort();
            files
        } else {
            vec![path.to_path_buf()]
        };
        info!("Found {} t3r result file(s)", files.len());
        Ok(Self { files })
    }

    /// Number of files queued for extraction.
    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    /// Parse every file as a pKa document, one row per measured pKa.
    pub fn extract_pka(&self) -> ResultSet<PkaRow> {
        let mut set = ResultSet {
            rows: Vec::new(),
            failed: Vec::new(),
        };
        for file in &self.files {
            debug!("Parsing T3R XML file: {}", file.display());
            match pka_rows(file) {
                Ok(rows) => set.rows.extend(rows),
                Err(e) => record_failure(&mut set.failed, file, e),
            }
        }
        set
    }

    /// Parse every file as a logP document, one row per file.
    pub fn extract_logp(&self) -> ResultSet<LogpRow> {
        let mut set = ResultSet {
            rows: Vec::new(),
            failed: Vec::new(),
        };
        for file in &self.files {
            debug!("Parsing T3R XML file: {}", file.display());
            match logp_row(file) {
                Ok(row) => set.rows.push(row),
                Err(e) => record_failure(&mut set.failed, file, e),
            }
        }
        set
    }
}

fn record_failure(failed: &mut Vec<FailedFile>, file: &Path, e: crate::t3r::T3rError) {
    error!("Error parsing {}: {e}", file.display());
    failed.push(FailedFile {
        filename: file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string()),
        reason: e.to_string(),
    });
}

fn pka_rows(path: &Path) -> Result<Vec<PkaRow>, crate::t3r::T3rError> {
    let doc = PkaResultFile::open(path)?;
    let measurements = doc.measured_pkas()?;
    let cosolvent = doc.cosolvent_name();
    let cosolvent_fractions = doc.cosolvent_fractions().map(|fractions| {
        fractions
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    });
    let sample = doc.file().sample_name()?.to_string();
    let assay_name = doc.file().assay_name()?.to_string();
    let assay_quality = doc.file().assay_quality()?.to_string();
    let filename = doc.file().file_name();

    Ok(measurements
        .into_iter()
        .enumerate()
        .map(|(i, m)| PkaRow {
            sample: sample.clone(),
            filename: filename.clone(),
            assay_name: assay_name.clone(),
            assay_quality: assay_quality.clone(),
            pka_number: i + 1,
            pka_type: m.pka_type,
            pka_value: m.value,
            pka_std: m.std,
            pka_ionic_strength: m.ionic_strength,
            pka_temperature: m.temperature,
            cosolvent: cosolvent.clone(),
            cosolvent_fractions: cosolvent_fractions.clone(),
        })
        .collect())
}

fn logp_row(path: &Path) -> Result<LogpRow, crate::t3r::T3rError> {
    let doc = LogpResultFile::open(path)?;
    let measurement = doc.logp_measurement()?;
    Ok(LogpRow {
        filename: doc.file().file_name(),
        sample: doc.file().sample_name()?.to_string(),
        assay_name: doc.file().assay_name()?.to_string(),
        assay_quality: doc.file().assay_quality()?.to_string(),
        logp: measurement.value,
        rmsd: measurement.rmsd,
        solvent: measurement.solvent,
    })
}
