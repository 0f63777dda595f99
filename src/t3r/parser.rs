//! Typed views over parsed .t3r result documents.
//!
//! [`ResultFile`] holds the parsed tree and the accessors every result file
//! shares; [`PkaResultFile`] and [`LogpResultFile`] wrap it with the
//! category-specific extraction for the two assay protocols. Constructors
//! verify the document's declared category up front, so a wrong-typed file
//! never produces a partially-populated result.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{info, warn};

use crate::t3r::document::{parse_document, XmlElement};
use crate::t3r::error::T3rError;
use crate::t3r::models::{AssayCategory, LogPMeasurement, PkaMeasurement, PkaType};

/// Root element name of every .t3r result document.
const ROOT_ELEMENT: &str = "DirectControlAssayResultsFile";

/// One parsed result document with the accessors common to all assay types.
#[derive(Debug)]
pub struct ResultFile {
    path: PathBuf,
    root: XmlElement,
}

impl ResultFile {
    /// Parse a .t3r file into an element tree and verify its root element.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, T3rError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let root = parse_document(BufReader::new(file))?;
        if root.name() != ROOT_ELEMENT {
            return Err(T3rError::InvalidStructure(format!(
                "expected root element {ROOT_ELEMENT}, found {}",
                root.name()
            )));
        }
        info!("Loaded file {}", path.display());
        Ok(Self { path, root })
    }

    /// Path the document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component of the path, for result rows and failure lists.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub(crate) fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Sample identifier from the document summary.
    pub fn sample_name(&self) -> Result<&str, T3rError> {
        self.root.require_text(&["Summary", "SampleName"])
    }

    /// Assay template name from the document summary.
    pub fn assay_name(&self) -> Result<&str, T3rError> {
        self.root.require_text(&["Summary", "AssayName"])
    }

    /// Declared assay category.
    pub fn assay_category(&self) -> Result<AssayCategory, T3rError> {
        let value = self
            .root
            .require_text(&["AssayData", "AssayTemplate", "Category"])?;
        AssayCategory::parse(value)
    }

    /// Quality grade assigned by the instrument software.
    pub fn assay_quality(&self) -> Result<&str, T3rError> {
        self.root
            .require_text(&["ProcessedData", "AssayQuality", "Quality"])
    }

    /// Assay start timestamp from the document summary.
    pub fn assay_start_time(&self) -> Result<NaiveDateTime, T3rError> {
        let element = "Summary/StartTime";
        let raw = self.root.require_text(&["Summary", "StartTime"])?;
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| {
                chrono::DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_local())
            })
            .map_err(|_| T3rError::InvalidValue {
                element: element.to_string(),
                value: raw.to_string(),
            })
    }
}

/// Result document from a pKa assay.
#[derive(Debug)]
pub struct PkaResultFile {
    file: ResultFile,
}

impl PkaResultFile {
    /// Category this parser accepts.
    pub const EXPECTED_CATEGORY: AssayCategory = AssayCategory::Pka;

    /// Open and verify a pKa result document.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, T3rError> {
        let file = ResultFile::open(path)?;
        let found = file.assay_category()?;
        if found != Self::EXPECTED_CATEGORY {
            return Err(T3rError::WrongAssayType {
                expected: Self::EXPECTED_CATEGORY,
                found,
            });
        }
        Ok(Self { file })
    }

    /// Shared document accessors.
    pub fn file(&self) -> &ResultFile {
        &self.file
    }

    /// Measured pKas with types assigned from the predicted list.
    ///
    /// Results come from exactly one of two locations: the fast/mean result
    /// is tried first, then the dielectric fit; neither present is
    /// [`T3rError::NoPkaData`]. Types are assigned by positional zip with
    /// the predicted pKas; when the lists differ in length the zip stops at
    /// the shorter one (preserved instrument-workflow behavior, logged).
    pub fn measured_pkas(&self) -> Result<Vec<PkaMeasurement>, T3rError> {
        let mut measured = match self.fast_dpas_mean_results() {
            Ok(results) => results,
            Err(T3rError::MissingField(_)) => match self.dielectric_fit_results() {
                Ok(results) => results,
                Err(T3rError::MissingField(_)) => return Err(T3rError::NoPkaData),
                Err(e) => return Err(e),
            },
            Err(e) => return Err(e),
        };

        let predicted = self.predicted_pkas()?;
        if measured.len() != predicted.len() {
            warn!(
                "{}: {} measured but {} predicted pKas; types assigned only up to the shorter list",
                self.file.path().display(),
                measured.len(),
                predicted.len()
            );
        }
        for (meas, pred) in measured.iter_mut().zip(&predicted) {
            meas.pka_type = pred.pka_type;
        }
        Ok(measured)
    }

    /// pKa results from the `FastDpasMeanResult` element: four parallel
    /// space-separated value lists aligned by index.
    fn fast_dpas_mean_results(&self) -> Result<Vec<PkaMeasurement>, T3rError> {
        let obj = self
            .file
            .root()
            .require(&["ProcessedData", "FastDpasMeanResult"])?;

        let values = parallel_values(obj, "MeanPkaResults")?;
        let stds = parallel_values(obj, "MeanPkasStdDevs")?;
        let ionic_strengths = parallel_values(obj, "MeanPkasAverageIonicStrength")?;
        let temperatures = parallel_values(obj, "MeanPkasAverageTemperature")?;

        let declared = obj.require(&["MeanPkaResults"])?;
        let count: usize = declared
            .attr("size")
            .ok_or_else(|| T3rError::MissingField("MeanPkaResults@size".to_string()))?
            .parse()
            .map_err(|_| T3rError::InvalidValue {
                element: "MeanPkaResults@size".to_string(),
                value: declared.attr("size").unwrap_or_default().to_string(),
            })?;

        let mut results = Vec::with_capacity(count);
        for i in 0..count {
            results.push(PkaMeasurement {
                value: nth(&values, i, "MeanPkaResults")?,
                std: Some(nth(&stds, i, "MeanPkasStdDevs")?),
                ionic_strength: Some(nth(&ionic_strengths, i, "MeanPkasAverageIonicStrength")?),
                temperature: Some(nth(&temperatures, i, "MeanPkasAverageTemperature")?),
                pka_type: None,
                source: None,
            });
        }
        Ok(results)
    }

    /// pKa results from the Yasuda-Shedlovsky dielectric fit: one
    /// self-contained record per fit, a single record being a one-fit list.
    fn dielectric_fit_results(&self) -> Result<Vec<PkaMeasurement>, T3rError> {
        let fit_parent = self.file.root().require(&[
            "ProcessedData",
            "YasudaShedlovskyResult",
            "DielectricFit",
        ])?;
        let fits: Vec<&XmlElement> = fit_parent.children_named("YasudaShedlovskyFit").collect();
        if fits.is_empty() {
            return Err(T3rError::MissingField(
                "DielectricFit/YasudaShedlovskyFit".to_string(),
            ));
        }
        fits.iter()
            .map(|fit| {
                Ok(PkaMeasurement {
                    value: fit.require_f64(&["AqueousPka"])?,
                    std: Some(fit.require_f64(&["ConfidenceInterval"])?),
                    ionic_strength: Some(fit.require_f64(&["AverageIonicStrength"])?),
                    temperature: Some(fit.require_f64(&["AverageTemperature"])?),
                    pka_type: None,
                    source: None,
                })
            })
            .collect()
    }

    /// Predicted pKas fed into the experiment, one per expected pKa.
    pub fn predicted_pkas(&self) -> Result<Vec<PkaMeasurement>, T3rError> {
        let sample = self
            .file
            .root()
            .require(&["ProcessedData", "PhMetricModel", "Sample"])?;
        let predictions: Vec<&XmlElement> = sample.children_named("Pka").collect();
        if predictions.is_empty() {
            return Err(T3rError::MissingField(
                "PhMetricModel/Sample/Pka".to_string(),
            ));
        }
        predictions
            .iter()
            .map(|pred| {
                Ok(PkaMeasurement {
                    value: pred.require_f64(&["PkaValue", "Value"])?,
                    std: None,
                    ionic_strength: None,
                    temperature: None,
                    pka_type: Some(PkaType::parse(pred.require_text(&["PkaType", "Value"])?)?),
                    source: Some(pred.require_text(&["PkaValue", "Source"])?.to_string()),
                })
            })
            .collect()
    }

    /// Instrument-ready pKa string: comma-joined `type,value` pairs with the
    /// predicted type and the measured value, e.g. `"base,8.11591"`.
    pub fn formatted_pkas(&self) -> Result<String, T3rError> {
        let predicted = self.predicted_pkas()?;
        let measured = self.measured_pkas()?;
        let pairs: Vec<String> = predicted
            .iter()
            .zip(&measured)
            .filter_map(|(pred, meas)| {
                pred.pka_type
                    .map(|t| format!("{},{}", t.as_lower(), meas.value))
            })
            .collect();
        Ok(pairs.join(","))
    }

    /// Name of the cosolvent used, from the first sweep. Optional
    /// enrichment: absence degrades to `None` with a warning, never an
    /// error.
    pub fn cosolvent_name(&self) -> Option<String> {
        let processed = self.file.root().child("ProcessedData")?;
        let first_sweep = processed.child("Sweep")?;
        match first_sweep.descend(&["FastDpasResult", "CosolventRatio", "CosolventName"]) {
            Some(name) => Some(name.text().to_string()),
            None => {
                warn!(
                    "Could not extract cosolvent name from {}",
                    self.file.path().display()
                );
                None
            }
        }
    }

    /// Cosolvent weight fractions across all sweeps. Same tolerance as
    /// [`cosolvent_name`](Self::cosolvent_name).
    pub fn cosolvent_fractions(&self) -> Option<Vec<f64>> {
        let processed = self.file.root().child("ProcessedData")?;
        let sweeps: Vec<&XmlElement> = processed.children_named("Sweep").collect();
        if sweeps.is_empty() {
            return None;
        }
        let mut fractions = Vec::with_capacity(sweeps.len());
        for sweep in sweeps {
            let fraction = sweep
                .descend(&["FastDpasResult", "CosolventRatio", "WtFraction"])
                .and_then(|e| e.text().parse::<f64>().ok());
            match fraction {
                Some(f) => fractions.push(f),
                None => {
                    warn!(
                        "Could not extract cosolvent fractions from {}",
                        self.file.path().display()
                    );
                    return None;
                }
            }
        }
        Some(fractions)
    }
}

/// Result document from a logP assay.
#[derive(Debug)]
pub struct LogpResultFile {
    file: ResultFile,
}

impl LogpResultFile {
    /// Category this parser accepts.
    pub const EXPECTED_CATEGORY: AssayCategory = AssayCategory::Logp;

    /// Open and verify a logP result document.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, T3rError> {
        let file = ResultFile::open(path)?;
        let found = file.assay_category()?;
        if found != Self::EXPECTED_CATEGORY {
            return Err(T3rError::WrongAssayType {
                expected: Self::EXPECTED_CATEGORY,
                found,
            });
        }
        Ok(Self { file })
    }

    /// Shared document accessors.
    pub fn file(&self) -> &ResultFile {
        &self.file
    }

    /// The document's single logP measurement.
    pub fn logp_measurement(&self) -> Result<LogPMeasurement, T3rError> {
        let data = self
            .file
            .root()
            .require(&["ProcessedData", "MultisweepPhMetricResult"])?;
        let rmsd = data.require_f64(&["Rmsd"])?;

        let sample_values = data.require(&["MultisweepPhMetricLevelResult", "SampleValues"])?;
        let values: Vec<f64> = sample_values
            .children_named("Logp")
            .map(|e| e.parse_f64("SampleValues/Logp"))
            .collect::<Result<_, _>>()?;
        if values.is_empty() {
            return Err(T3rError::MissingField("SampleValues/Logp".to_string()));
        }

        // Takes the larger of the two reported sweep values. Instrument
        // convention carried over from the measurement workflow; not yet
        // confirmed with the vendor.
        let value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(LogPMeasurement {
            value,
            rmsd,
            solvent: self.solvent()?.to_string(),
        })
    }

    /// Partition solvent label from the assay settings.
    pub fn solvent(&self) -> Result<&str, T3rError> {
        self.file.root().require_text(&[
            "AssayData",
            "AssayTemplate",
            "Settings",
            "PartitionType",
            "Value",
        ])
    }
}

/// Parse one of the space-separated parallel value lists under
/// `FastDpasMeanResult`.
fn parallel_values(parent: &XmlElement, name: &str) -> Result<Vec<f64>, T3rError> {
    let element = parent.require(&[name])?;
    element
        .text()
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| T3rError::InvalidValue {
                element: name.to_string(),
                value: token.to_string(),
            })
        })
        .collect()
}

fn nth(values: &[f64], index: usize, element: &str) -> Result<f64, T3rError> {
    values.get(index).copied().ok_or_else(|| {
        T3rError::InvalidValue {
            element: element.to_string(),
            value: format!("has {} values, expected index {index}", values.len()),
        }
    })
}
