//! Error types for NuSight

use thiserror::Error;

/// NuSight error type
///
/// Only structural problems live here: they abort the run that produced
/// them. Per-event conditions such as a missing lepton are not errors; the
/// engines report those as skip reasons.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// A negative or non-finite cross-section weight reached ingestion.
    #[error("invalid weight {weight} for event {index}")]
    InvalidWeight {
        /// Event index in its source.
        index: usize,
        /// Offending weight.
        weight: f64,
    },

    /// A required column/field is absent from an event source.
    #[error("missing column: '{0}'")]
    MissingColumn(String),

    /// Curves combined into one composite do not share an energy grid.
    #[error("misaligned curves: {0}")]
    MisalignedCurves(String),

    /// Index past the end of an event source.
    #[error("event index {index} out of range (count = {count})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of events in the source.
        count: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
