//! Core value types for assay results.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::t3r::error::T3rError;

/// Assay categories handled by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssayCategory {
    /// Acid/base dissociation constant measurement
    Pka,
    /// Partition coefficient measurement
    Logp,
}

impl AssayCategory {
    /// Case-insensitive lookup from a document field.
    pub fn parse(value: &str) -> Result<Self, T3rError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pka" => Ok(Self::Pka),
            "logp" => Ok(Self::Logp),
            _ => Err(T3rError::UnknownCategory(value.to_string())),
        }
    }

    /// Identify a result file's category with a cheap text scan, without
    /// parsing the whole document. Expects exactly one `<Category>` element.
    pub fn sniff<P: AsRef<Path>>(path: P) -> Result<Self, T3rError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let mut found = None;
        let mut occurrences = 0usize;
        let mut rest = contents.as_str();
        while let Some(start) = rest.find("<Category>") {
            let tail = &rest[start + "<Category>".len()..];
            let Some(end) = tail.find("</Category>") else {
                break;
            };
            found = Some(&tail[..end]);
            occurrences += 1;
            rest = &tail[end..];
        }
        match (occurrences, found) {
            (1, Some(value)) => Self::parse(value),
            _ => Err(T3rError::InvalidStructure(format!(
                "expected exactly one <Category> element, found {occurrences}"
            ))),
        }
    }
}

impl fmt::Display for AssayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pka => write!(f, "pka"),
            Self::Logp => write!(f, "logp"),
        }
    }
}

/// Acid or base character of one pKa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PkaType {
    /// Acidic dissociation
    Acid,
    /// Basic dissociation
    Base,
}

impl PkaType {
    /// Case-insensitive lookup from a document field.
    pub fn parse(value: &str) -> Result<Self, T3rError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "acid" => Ok(Self::Acid),
            "base" => Ok(Self::Base),
            _ => Err(T3rError::UnknownPkaType(value.to_string())),
        }
    }

    /// Lowercase rendering used in extracted instrument strings.
    pub fn as_lower(self) -> &'static str {
        match self {
            Self::Acid => "acid",
            Self::Base => "base",
        }
    }

    /// Uppercase rendering used in schedule import files.
    pub fn as_upper(self) -> &'static str {
        match self {
            Self::Acid => "ACID",
            Self::Base => "BASE",
        }
    }
}

impl fmt::Display for PkaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_lower())
    }
}

/// One measured or predicted pKa.
///
/// Constructed only by document extraction; immutable afterwards. A single
/// document may yield zero, one, or many of these.
#[derive(Debug, Clone, PartialEq)]
pub struct PkaMeasurement {
    /// Measured (or predicted) pKa value
    pub value: f64,
    /// Standard deviation or confidence interval, when reported
    pub std: Option<f64>,
    /// Average ionic strength during measurement
    pub ionic_strength: Option<f64>,
    /// Average temperature during measurement
    pub temperature: Option<f64>,
    /// Acid/base character, assigned from the predicted pKa list
    pub pka_type: Option<PkaType>,
    /// Textual provenance of a predicted value
    pub source: Option<String>,
}

/// One measured logP.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPMeasurement {
    /// The reported logP (the larger of the two sweep values)
    pub value: f64,
    /// Fit RMSD as reported by the instrument
    pub rmsd: f64,
    /// Partition solvent label from the assay settings
    pub solvent: String,
}
