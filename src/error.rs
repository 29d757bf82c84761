//! Error types for u-polypack.
//!
//! Only configuration and input problems are errors. A shape that cannot be
//! placed is a normal outcome and never surfaces here.

use thiserror::Error;

/// Errors raised while building instances, loading files, or configuring a run.
#[derive(Error, Debug)]
pub enum PackError {
    /// Invalid run configuration (e.g. population smaller than two).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The instance or cache file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file content is not valid JSON for the expected schema.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Parallel coordinate or translation arrays differ in length.
    #[error("mismatched lengths in {what}: {left} vs {right}")]
    MismatchedLengths {
        /// Which record carried the arrays.
        what: String,
        /// Length of the first array.
        left: usize,
        /// Length of the second array.
        right: usize,
    },

    /// A polygon with fewer than three vertices or zero area.
    #[error("degenerate polygon: {0}")]
    DegeneratePolygon(String),

    /// A solution record refers to a catalog item that does not exist
    /// (or to more copies of it than the catalog holds).
    #[error("unknown item {index} (occurrence {occurrence})")]
    UnknownItem {
        /// Catalog item index from the record.
        index: usize,
        /// 0-based occurrence of that index within the record.
        occurrence: usize,
    },

    /// A solution record belongs to a different instance.
    #[error("solution belongs to instance '{found}', expected '{expected}'")]
    InstanceMismatch {
        /// Name of the instance the run is working on.
        expected: String,
        /// Name found in the record.
        found: String,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PackError>;
