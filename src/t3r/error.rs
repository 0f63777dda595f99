//! Error types for .t3r document parsing.

use crate::t3r::models::AssayCategory;

/// Errors that can occur while loading or extracting a single .t3r document.
///
/// Every variant is fatal to the document it came from, never to a whole
/// batch; the aggregator in [`crate::batch`] records these per file and
/// keeps going.
#[derive(Debug, thiserror::Error)]
pub enum T3rError {
    /// The bytes could not be parsed as well-formed XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document parsed but its element structure is not usable
    #[error("invalid document structure: {0}")]
    InvalidStructure(String),

    /// The document's declared assay category does not match the parser
    #[error("expected a {expected} assay, found {found}")]
    WrongAssayType {
        /// Category the parser was built for
        expected: AssayCategory,
        /// Category the document declared
        found: AssayCategory,
    },

    /// Neither of the two pKa result locations is present in the document
    #[error("no pKa results found under FastDpasMeanResult or YasudaShedlovskyResult")]
    NoPkaData,

    /// An expected element or attribute is absent
    #[error("missing element: {0}")]
    MissingField(String),

    /// An element held text that could not be parsed as the expected type
    #[error("invalid value for {element}: {value:?}")]
    InvalidValue {
        /// Path of the offending element
        element: String,
        /// The text that failed to parse
        value: String,
    },

    /// The document declared an assay category outside {pka, logp}
    #[error("unrecognized assay category: {0:?}")]
    UnknownCategory(String),

    /// The document declared a pKa type outside {acid, base}
    #[error("unrecognized pKa type: {0:?}")]
    UnknownPkaType(String),
}
