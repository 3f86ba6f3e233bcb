//! Core domain types for the movie metadata dataset.
//!
//! - [`MovieRecord`]: the normalized, typed projection of one row
//! - [`RawTable`]: the loaded table, cells kept as source text
//! - [`Row`]: a borrowed view of one table row, keyed by column name

use crate::error::{DatasetError, Result};
use std::fmt;

// =============================================================================
// Column names
// =============================================================================

pub const TITLE: &str = "title";
pub const RELEASE_DATE: &str = "release_date";
pub const VOTE_AVERAGE: &str = "vote_average";
pub const GENRES: &str = "genres";
pub const OVERVIEW: &str = "overview";
/// Optional identifier column, carried into exports when present
pub const ID: &str = "id";

/// Columns every query-able table is expected to have
pub const REQUIRED_COLUMNS: [&str; 5] = [TITLE, RELEASE_DATE, VOTE_AVERAGE, GENRES, OVERVIEW];

// =============================================================================
// MovieRecord
// =============================================================================

/// One normalized movie entry.
///
/// Records are built on demand by the dataset engine and never mutated;
/// fields are private and read through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    title: String,
    release_date: String,
    vote_average: f64,
    genres: Vec<String>,
    overview: String,
}

impl MovieRecord {
    pub fn new(
        title: impl Into<String>,
        release_date: impl Into<String>,
        vote_average: f64,
        genres: Vec<String>,
        overview: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            release_date: release_date.into(),
            vote_average,
            genres,
            overview: overview.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Release date exactly as the source wrote it; not validated
    pub fn release_date(&self) -> &str {
        &self.release_date
    }

    pub fn vote_average(&self) -> f64 {
        self.vote_average
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn overview(&self) -> &str {
        &self.overview
    }

    /// Render the record as a single human-readable line
    ///
    /// ```
    /// use movie_data::MovieRecord;
    ///
    /// let movie = MovieRecord::new("Heat", "1995-12-15", 7.7, vec!["Action".into(), "Crime".into()], "A heist.");
    /// assert_eq!(
    ///     movie.render(),
    ///     "Title: Heat, Release Date: 1995-12-15, Rating: 7.7, Genres: Action, Crime, Overview: A heist."
    /// );
    /// ```
    pub fn render(&self) -> String {
        format!(
            "Title: {}, Release Date: {}, Rating: {}, Genres: {}, Overview: {}",
            self.title,
            self.release_date,
            self.vote_average,
            self.genres.join(", "),
            self.overview
        )
    }
}

impl fmt::Display for MovieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// =============================================================================
// RawTable - the loaded, untyped table
// =============================================================================

/// The loaded tabular dataset.
///
/// Cells are stored as the text the source provided. An empty cell is
/// treated as a missing value by every accessor. The table is built once
/// and never modified afterwards; derived columns are computed as separate
/// views (see [`crate::stats`]).
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from a header and its rows
    ///
    /// ## Errors
    /// - `RowWidth` if a row's cell count differs from the header's
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != headers.len())
        {
            return Err(DatasetError::RowWidth {
                row,
                expected: headers.len(),
                found: cells.len(),
            });
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column in the header, if present
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Required columns this table lacks, in [`REQUIRED_COLUMNS`] order
    pub fn missing_required_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !self.has_column(column))
            .collect()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            index,
            headers: &self.headers,
            cells,
        })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        self.rows.iter().enumerate().map(|(index, cells)| Row {
            index,
            headers: &self.headers,
            cells,
        })
    }

    /// Iterate one column's cells in row order (`None` for empty cells).
    ///
    /// Returns `None` if the column does not exist.
    pub fn column<'a>(
        &'a self,
        column: &str,
    ) -> Option<impl Iterator<Item = Option<&'a str>> + use<'a>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |cells| non_empty(&cells[idx])))
    }
}

/// Borrowed view of one row of a [`RawTable`]
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: usize,
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Zero-based position of this row in the source table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the row's table has this column at all
    pub fn has(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Cell value for a column.
    ///
    /// - `None`: the column does not exist
    /// - `Some(None)`: the column exists but the cell is empty
    pub fn get(&self, column: &str) -> Option<Option<&'a str>> {
        let idx = self.headers.iter().position(|h| h == column)?;
        let cells = self.cells;
        Some(non_empty(&cells[idx]))
    }
}

fn non_empty(cell: &str) -> Option<&str> {
    if cell.is_empty() { None } else { Some(cell) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RawTable {
        RawTable::new(
            vec!["title".into(), "vote_average".into()],
            vec![
                vec!["Heat".into(), "7.7".into()],
                vec!["".into(), "6.1".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_render_joins_genres() {
        let movie = MovieRecord::new(
            "Toy Story",
            "1995-10-30",
            7.7,
            vec!["Animation".to_string(), "Comedy".to_string(), "Family".to_string()],
            "Woody and friends.",
        );
        assert_eq!(
            movie.render(),
            "Title: Toy Story, Release Date: 1995-10-30, Rating: 7.7, \
             Genres: Animation, Comedy, Family, Overview: Woody and friends."
        );
        assert_eq!(movie.to_string(), movie.render());
    }

    #[test]
    fn test_render_without_genres() {
        let movie = MovieRecord::new("Untitled", "", 0.0, vec![], "");
        assert_eq!(
            movie.render(),
            "Title: Untitled, Release Date: , Rating: 0, Genres: , Overview: "
        );
    }

    #[test]
    fn test_row_lookup() {
        let table = sample_table();
        let row = table.row(0).unwrap();
        assert_eq!(row.index(), 0);
        assert_eq!(row.get("title"), Some(Some("Heat")));
        assert_eq!(row.get("overview"), None);

        // Empty cells read as missing
        let row = table.row(1).unwrap();
        assert_eq!(row.get("title"), Some(None));
        assert!(table.row(2).is_none());
    }

    #[test]
    fn test_missing_required_columns() {
        let table = sample_table();
        assert_eq!(
            table.missing_required_columns(),
            vec!["release_date", "genres", "overview"]
        );
    }

    #[test]
    fn test_column_iteration() {
        let table = sample_table();
        let titles: Vec<_> = table.column("title").unwrap().collect();
        assert_eq!(titles, vec![Some("Heat"), None]);
        assert!(table.column("nope").is_none());
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let err = RawTable::new(
            vec!["title".into(), "release_date".into(), "vote_average".into()],
            vec![
                vec!["Heat".into(), "1995-12-15".into(), "7.7".into()],
                vec!["Alien".into()],
            ],
        )
        .unwrap_err();

        match err {
            DatasetError::RowWidth { row, expected, found } => {
                assert_eq!(row, 1);
                assert_eq!(expected, 3);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
