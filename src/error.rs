//! The [`MethCovError`] `enum` definition and error messages.
//!
use std::path::PathBuf;
use thiserror::Error;

use crate::Position;

/// The [`MethCovError`] defines the standard set of errors that should
/// be passed to the user.
///
/// Errors fall into two families: *not found* errors (see
/// [`MethCovError::is_not_found()`]) and *format* errors (see
/// [`MethCovError::is_format_error()`]). Both are fatal for the file they
/// concern, but never for a whole batch.
#[derive(Debug, Error)]
pub enum MethCovError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("File or directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Delimited file error: {0}")]
    CsvError(#[from] csv::Error),

    // Coverage file parsing errors
    #[error("Coverage file has {found} columns on line {line}; expected 6 (chromosome, start, end, methylation rate, methylated reads, unmethylated reads)")]
    CoverageColumnCount { line: u64, found: usize },
    #[error("Coverage file has an invalid {column} entry on line {line}: {message}")]
    InvalidCoverageField {
        line: u64,
        column: &'static str,
        message: String,
    },

    // Region catalog errors
    #[error("Region catalog is missing a '{0}' column")]
    MissingCatalogColumn(&'static str),
    #[error("Region catalog has an invalid {column} entry on line {line}: '{value}'")]
    InvalidCatalogField {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("Region '{0}' is invalid: start ({1}) must not be greater than end ({2})")]
    InvalidRegion(String, Position, Position),
    #[error("Region catalog contains no regions")]
    EmptyCatalog,

    // Sample metadata errors
    #[error("Malformed sample filename '{0}': expected <source>_<subject>_<age>_<tissue>.<ext>")]
    MalformedFilename(String),

    // Batch related errors
    #[error("Could not build worker thread pool: {0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),
}

/// Stream errors raised while decoding bad bytes: invalid UTF-8, or a corrupt
/// or truncated gzip stream.
fn is_corrupt_stream(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::InvalidData
            | std::io::ErrorKind::InvalidInput
            | std::io::ErrorKind::UnexpectedEof
    )
}

impl MethCovError {
    /// Whether this error means a referenced file or directory does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            MethCovError::NotFound(_) => true,
            MethCovError::IOError(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Whether this error is caused by malformed input content: a bad column
    /// count, a non-numeric field, an invalid region, a malformed filename,
    /// invalid UTF-8 or a corrupt gzip stream.
    pub fn is_format_error(&self) -> bool {
        match self {
            MethCovError::CoverageColumnCount { .. }
            | MethCovError::InvalidCoverageField { .. }
            | MethCovError::MissingCatalogColumn(_)
            | MethCovError::InvalidCatalogField { .. }
            | MethCovError::InvalidRegion(..)
            | MethCovError::EmptyCatalog
            | MethCovError::MalformedFilename(_) => true,
            MethCovError::IOError(e) => is_corrupt_stream(e),
            MethCovError::CsvError(e) => match e.kind() {
                csv::ErrorKind::Utf8 { .. }
                | csv::ErrorKind::Deserialize { .. }
                | csv::ErrorKind::UnequalLengths { .. } => true,
                csv::ErrorKind::Io(io_error) => is_corrupt_stream(io_error),
                _ => false,
            },
            _ => false,
        }
    }
}
