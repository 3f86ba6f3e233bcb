//! The dataset engine: owns the loaded table and converts rows to records.
//!
//! Aggregate queries live in [`crate::stats`] and export in
//! [`crate::export`]; both extend [`MovieDataset`] with further `impl`
//! blocks.

use crate::error::{DatasetError, Result};
use crate::export;
use crate::genres::decode_genres;
use crate::parser::{self, LoadOptions};
use crate::stats::parse_rating;
use crate::types::{GENRES, MovieRecord, OVERVIEW, RELEASE_DATE, RawTable, Row, TITLE, VOTE_AVERAGE};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// A loaded movie dataset.
///
/// The table is read once at construction and never modified; every query
/// takes `&self` and computes its result from the table.
#[derive(Debug, Clone)]
pub struct MovieDataset {
    /// Backing file, when the dataset was loaded from disk
    path: Option<PathBuf>,
    table: RawTable,
}

impl MovieDataset {
    /// Load a comma-separated movie table with default [`LoadOptions`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_options(path, &LoadOptions::default())
    }

    /// Load a delimited movie table
    ///
    /// ## Errors
    /// - `NotFound` if `path` does not exist
    /// - `EmptyInput` if the file has no data rows
    /// - `MalformedInput` if a row does not match the header structure
    /// - `Load` for any other read failure
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_with_options(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading movie data");

        let table = parser::read_csv(path, options)
            .inspect_err(|e| error!(error = %e, "Failed to load movie data"))?;

        Ok(Self::with_source(Some(path.to_path_buf()), table))
    }

    /// Load a file previously written by [`MovieDataset::export`]
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_export(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading exported movie data");

        let movies = export::read_export(path)
            .inspect_err(|e| error!(error = %e, "Failed to load exported movie data"))?;

        let table = export::table_from_export(movies)?;
        Ok(Self::with_source(Some(path.to_path_buf()), table))
    }

    /// Wrap an already-built table
    pub fn from_table(table: RawTable) -> Self {
        Self::with_source(None, table)
    }

    fn with_source(path: Option<PathBuf>, table: RawTable) -> Self {
        let missing = table.missing_required_columns();
        if !missing.is_empty() {
            warn!(columns = ?missing, "Table is missing required columns");
        }
        info!(
            rows = table.len(),
            columns = table.headers().len(),
            "Data loaded successfully"
        );
        Self { path, table }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn table(&self) -> &RawTable {
        &self.table
    }

    /// Column names in source order
    pub fn columns(&self) -> &[String] {
        self.table.headers()
    }

    /// Number of rows, including rows whose rating is not numeric
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Convert one row into a [`MovieRecord`]
    ///
    /// Text columns are taken as-is (empty when missing), `vote_average`
    /// must parse as a finite number and `genres` is decoded best-effort.
    ///
    /// ## Errors
    /// - `MissingField` if a required column is absent from the table
    /// - `TypeConversion` if `vote_average` is empty or not numeric
    pub fn row_to_record(&self, row: Row<'_>) -> Result<MovieRecord> {
        let title = text_cell(&row, TITLE)?;
        let release_date = text_cell(&row, RELEASE_DATE)?;

        let rating_cell = cell(&row, VOTE_AVERAGE)?;
        let vote_average = rating_cell.and_then(parse_rating).ok_or_else(|| {
            let value = rating_cell.unwrap_or_default();
            error!(row = row.index(), value, "vote_average is not numeric");
            DatasetError::TypeConversion {
                column: VOTE_AVERAGE.to_string(),
                row: row.index(),
                value: value.to_string(),
                expected: "a floating-point number",
            }
        })?;

        let genres = decode_genres(cell(&row, GENRES)?.unwrap_or_default());
        let overview = text_cell(&row, OVERVIEW)?;

        Ok(MovieRecord::new(title, release_date, vote_average, genres, overview))
    }

    /// Record for the row at `index`, or `None` past the end of the table
    pub fn record_at(&self, index: usize) -> Option<Result<MovieRecord>> {
        self.table.row(index).map(|row| self.row_to_record(row))
    }

    /// Every row as a record; fails on the first row that cannot convert
    pub fn records(&self) -> Result<Vec<MovieRecord>> {
        self.table
            .rows()
            .map(|row| self.row_to_record(row))
            .collect()
    }

    /// Cells of a required column, logging when the column is absent
    pub(crate) fn require_column<'a>(
        &'a self,
        column: &str,
    ) -> Result<impl Iterator<Item = Option<&'a str>> + use<'a>> {
        self.table.column(column).ok_or_else(|| {
            error!(column, path = ?self.path, "Required column is missing");
            DatasetError::missing_field(column)
        })
    }
}

fn cell<'a>(row: &Row<'a>, column: &str) -> Result<Option<&'a str>> {
    row.get(column).ok_or_else(|| {
        error!(column, "Required column is missing");
        DatasetError::missing_field(column)
    })
}

fn text_cell(row: &Row<'_>, column: &str) -> Result<String> {
    Ok(cell(row, column)?.unwrap_or_default().to_string())
}
