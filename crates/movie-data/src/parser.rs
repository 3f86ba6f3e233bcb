//! Parser for the movie metadata CSV file.
//!
//! Reads the whole file into a [`RawTable`] with the `csv` crate. Quoted
//! fields may contain commas and newlines; every record must have as many
//! fields as the header.

use crate::error::{DatasetError, Result};
use crate::types::RawTable;
use csv::{ErrorKind, ReaderBuilder, Trim};
use std::fs::File;
use std::io;
use std::path::Path;

/// Options controlling how the input table is read
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter byte (default: `,`)
    pub delimiter: u8,
    /// Trim surrounding whitespace from cells (default: false). Headers are
    /// always trimmed.
    pub trim: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: false,
        }
    }
}

impl LoadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

/// Open an input file, mapping a missing path to [`DatasetError::NotFound`]
pub(crate) fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DatasetError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DatasetError::Load {
            path: path.to_path_buf(),
            source: Box::new(e),
        },
    })
}

/// Read a delimited file into a [`RawTable`]
///
/// Fails with `EmptyInput` when there is no header or no data row, and with
/// `MalformedInput` when a record's width differs from the header's or it
/// is not valid UTF-8.
pub fn read_csv(path: &Path, options: &LoadOptions) -> Result<RawTable> {
    let file = open_input(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .trim(if options.trim { Trim::All } else { Trim::Headers })
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(normalize_header)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(DatasetError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(DatasetError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    RawTable::new(headers, rows)
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Classify a csv error: structural problems are `MalformedInput`,
/// everything else is wrapped as `Load`.
fn csv_error(path: &Path, e: csv::Error) -> DatasetError {
    let line = e.position().map(|pos| pos.line()).unwrap_or(0);
    let reason = match e.kind() {
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => Some(format!("expected {expected_len} fields but found {len}")),
        ErrorKind::Utf8 { err, .. } => Some(format!("invalid UTF-8: {err}")),
        _ => None,
    };

    match reason {
        Some(reason) => DatasetError::MalformedInput {
            path: path.to_path_buf(),
            line,
            reason,
        },
        None => DatasetError::Load {
            path: path.to_path_buf(),
            source: Box::new(e),
        },
    }
}
