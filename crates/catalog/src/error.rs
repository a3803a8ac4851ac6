//! Error types produced by the catalog crate.
//!
//! Only failures that make the whole build meaningless are errors. A
//! malformed line is not one of them: the parser skips it and counts it in
//! [`CatalogStats::skipped_lines`](crate::CatalogStats).

use thiserror::Error;

/// Errors that abort catalog compilation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {reason}")]
    Read { path: String, reason: String },
    /// Compile options are unusable.
    #[error("invalid compile options: {0}")]
    InvalidOptions(String),
    /// Nothing in the input looked like a section header.
    #[error("catalog contains no sections ({skipped_lines} lines skipped)")]
    NoSections { skipped_lines: usize },
}
