//! # .t3r Result Document Model
//!
//! Parsing of SiriusT3 instrument result files (`.t3r`), which are XML
//! documents describing one assay run on one sample.
//!
//! ## Document structure
//!
//! ```text
//! DirectControlAssayResultsFile
//! ├── Summary (AssayName, StartTime, SampleName)
//! ├── AssayData
//! │   └── AssayTemplate
//! │       ├── Category (pKa | LogP)
//! │       └── Settings.PartitionType.Value (logP solvent)
//! └── ProcessedData
//!     ├── AssayQuality.Quality
//!     ├── FastDpasMeanResult            (pKa location A: parallel lists)
//!     ├── YasudaShedlovskyResult
//!     │   └── DielectricFit.YasudaShedlovskyFit*  (pKa location B)
//!     ├── PhMetricModel.Sample.Pka*     (predicted pKas)
//!     ├── Sweep*                        (cosolvent enrichment, optional)
//!     └── MultisweepPhMetricResult      (logP)
//! ```
//!
//! Documents are parsed into a generic [`XmlElement`] tree and navigated by
//! path, because the instrument emits single records and lists
//! interchangeably depending on protocol version.

mod document;
mod error;
mod models;
mod parser;

pub use document::{parse_document, XmlElement};
pub use error::T3rError;
pub use models::{AssayCategory, LogPMeasurement, PkaMeasurement, PkaType};
pub use parser::{LogpResultFile, PkaResultFile, ResultFile};
