//! Error types for property collections and their collaborators.

use std::path::PathBuf;
use thiserror::Error;

use super::Shape;

/// Main error type for property catalog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Identifier, title or record resolves to nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// More than one descriptor matched where exactly one is required
    #[error("Ambiguous selection: {matches} parts match where one is required")]
    AmbiguousSelection { matches: usize },

    /// Stored payload shape disagrees with the canonical shape
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: Shape, actual: Shape },

    /// Members of a stacking operation do not share one shape or identity
    #[error("Inconsistent shapes: {0}")]
    InconsistentShapes(String),

    /// Time series members are missing for some time indices
    #[error("Incomplete series: missing indices {missing:?}")]
    IncompleteSeries { missing: Vec<usize> },

    /// Categorical code already bound to different text
    #[error("Code {code} already maps to '{existing}', cannot map to '{requested}'")]
    DuplicateCode {
        code: i64,
        existing: String,
        requested: String,
    },

    /// Mutually exclusive fields both set, or required fields missing
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Support cannot index values by the requested element
    #[error("Indexable element '{element}' not supported by {support}")]
    UnsupportedElement { element: String, support: String },

    /// Descriptor attached to a different support than the collection
    #[error("Support mismatch: expected {expected}, got {actual}")]
    SupportMismatch { expected: String, actual: String },

    /// Value type mismatch
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Index out of range along one axis
    #[error("Index {index} out of bounds (len: {len})")]
    IndexOutOfBounds { index: isize, len: usize },

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of a store file
    #[error("Invalid array store: expected PRARR magic bytes")]
    InvalidMagic,

    /// Unsupported store format version
    #[error("Unsupported store version: {0}")]
    UnsupportedVersion(u16),

    /// Store file is truncated or corrupted
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// Invalid data structure in a store file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Store was opened read-only
    #[error("Array store is read-only")]
    ReadOnly,

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog (de)serialization error
    #[error("Catalog error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an invalid descriptor error.
    pub fn descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

/// Result type alias for property catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::AmbiguousSelection { matches: 3 };
        assert!(e.to_string().contains('3'));

        let e = Error::ShapeMismatch {
            expected: Shape::from_slice(&[2, 3, 4]),
            actual: Shape::from_slice(&[3, 4, 5]),
        };
        assert!(e.to_string().contains("[2 x 3 x 4]"));
        assert!(e.to_string().contains("[3 x 4 x 5]"));

        let e = Error::IncompleteSeries { missing: vec![1, 4] };
        assert!(e.to_string().contains("[1, 4]"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
