//! Error types for the movie-data crate.
//!
//! Every failure the dataset engine can surface is a variant of
//! [`DatasetError`]. Genre decoding failures are not variants here: they
//! are recovered inside [`crate::genres`] and never reach the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, querying or exporting a dataset
///
/// Variants carry the path or column involved so a failure can be diagnosed
/// from the message alone.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Input file does not exist
    #[error("Input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Input file has no data rows (or no header at all)
    #[error("Input file has no data rows: {}", path.display())]
    EmptyInput { path: PathBuf },

    /// A row could not be parsed against the header structure
    #[error("Malformed input in {} at line {line}: {reason}", path.display())]
    MalformedInput {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// An in-memory table row does not match the header width
    #[error("Row {row} has {found} cells but the header has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A required column is not present in the table
    #[error("Missing required column: {column}")]
    MissingField { column: String },

    /// A cell could not be coerced to the type its column requires
    #[error("Cannot convert {column} value '{value}' in row {row} to {expected}")]
    TypeConversion {
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    /// Export destination could not be created or written
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other failure during load, wrapping the original cause
    #[error("Failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DatasetError {
    pub(crate) fn missing_field(column: &str) -> Self {
        Self::MissingField {
            column: column.to_string(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DatasetError>;
