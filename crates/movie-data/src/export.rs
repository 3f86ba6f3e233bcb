//! Newline-delimited JSON export of the normalized dataset.
//!
//! One JSON object per line, one line per table row:
//!
//! ```text
//! {"id":"862","title":"Toy Story","release_date":"1995-10-30","vote_average":7.7,"genres":["Animation","Comedy"],"overview":"..."}
//! ```
//!
//! `vote_average` is `null` for rows whose rating is not numeric, and `id`
//! is only written when the source table has an `id` column.

use crate::dataset::MovieDataset;
use crate::error::{DatasetError, Result};
use crate::genres::{decode_genres, encode_genres};
use crate::parser::open_input;
use crate::stats::parse_rating;
use crate::types::{GENRES, ID, OVERVIEW, RELEASE_DATE, RawTable, Row, TITLE, VOTE_AVERAGE};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{error, info};

/// One exported line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedMovie {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub release_date: String,
    pub vote_average: Option<f64>,
    pub genres: Vec<String>,
    pub overview: String,
}

impl ExportedMovie {
    /// Normalize one table row. Missing text cells become empty strings.
    pub fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(ID).flatten().map(str::to_string),
            title: required_text(row, TITLE)?,
            release_date: required_text(row, RELEASE_DATE)?,
            vote_average: required_cell(row, VOTE_AVERAGE)?.and_then(parse_rating),
            genres: decode_genres(required_cell(row, GENRES)?.unwrap_or_default()),
            overview: required_text(row, OVERVIEW)?,
        })
    }

}

fn required_cell<'a>(row: &Row<'a>, column: &str) -> Result<Option<&'a str>> {
    row.get(column)
        .ok_or_else(|| DatasetError::missing_field(column))
}

fn required_text(row: &Row<'_>, column: &str) -> Result<String> {
    Ok(required_cell(row, column)?.unwrap_or_default().to_string())
}

impl MovieDataset {
    /// Write every row to `path` as newline-delimited JSON, replacing any
    /// existing file
    ///
    /// ## Errors
    /// - `Io` if the destination cannot be created or written
    /// - `MissingField` if the table lacks a required column
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let rows = write_export(self.table(), path)
            .inspect_err(|e| error!(error = %e, path = %path.display(), "Failed to save data"))?;
        info!(rows, path = %path.display(), "Data saved");
        Ok(())
    }
}

/// Write every row of `table` to `path`, replacing any existing file.
///
/// Rows are normalized before the file is touched, so a table that lacks a
/// required column fails with `MissingField` and leaves `path` alone.
/// Returns the number of lines written.
pub fn write_export(table: &RawTable, path: &Path) -> Result<usize> {
    let movies = table
        .rows()
        .map(|row| ExportedMovie::from_row(&row))
        .collect::<Result<Vec<_>>>()?;

    let io_error = |source: io::Error| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    for movie in &movies {
        serde_json::to_writer(&mut writer, movie).map_err(|e| io_error(e.into()))?;
        writer.write_all(b"\n").map_err(io_error)?;
    }
    writer.flush().map_err(io_error)?;

    Ok(movies.len())
}

/// Read a file written by [`write_export`]. Blank lines are skipped.
pub fn read_export(path: &Path) -> Result<Vec<ExportedMovie>> {
    let reader = BufReader::new(open_input(path)?);
    let mut movies = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx as u64 + 1;
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => DatasetError::MalformedInput {
                path: path.to_path_buf(),
                line: line_no,
                reason: "invalid UTF-8".to_string(),
            },
            _ => DatasetError::Load {
                path: path.to_path_buf(),
                source: Box::new(e),
            },
        })?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let movie = serde_json::from_str(trimmed).map_err(|e| DatasetError::MalformedInput {
            path: path.to_path_buf(),
            line: line_no,
            reason: e.to_string(),
        })?;
        movies.push(movie);
    }

    if movies.is_empty() {
        return Err(DatasetError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    Ok(movies)
}

/// Rebuild a [`RawTable`] from exported movies.
///
/// Genres are written back in their list-of-objects form and missing
/// ratings as empty cells, so the table reads exactly like a loaded CSV.
pub fn table_from_export(movies: Vec<ExportedMovie>) -> Result<RawTable> {
    let with_id = movies.iter().any(|m| m.id.is_some());

    let mut headers = Vec::with_capacity(6);
    if with_id {
        headers.push(ID.to_string());
    }
    headers.extend(
        [TITLE, RELEASE_DATE, VOTE_AVERAGE, GENRES, OVERVIEW]
            .iter()
            .map(|c| c.to_string()),
    );

    let rows = movies
        .into_iter()
        .map(|movie| {
            let mut cells = Vec::with_capacity(headers.len());
            if with_id {
                cells.push(movie.id.unwrap_or_default());
            }
            cells.push(movie.title);
            cells.push(movie.release_date);
            cells.push(
                movie
                    .vote_average
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
            cells.push(encode_genres(&movie.genres));
            cells.push(movie.overview);
            cells
        })
        .collect();

    RawTable::new(headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table() -> RawTable {
        RawTable::new(
            ["id", "title", "release_date", "vote_average", "genres", "overview"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![
                ["862", "Toy Story", "1995-10-30", "7.7", "[{'name': 'Animation'}]", "Toys."]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                ["", "Mystery", "", "n/a", "not a list", ""]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_row_normalizes() {
        let table = table();
        let first = ExportedMovie::from_row(&table.row(0).unwrap()).unwrap();
        assert_eq!(first.id.as_deref(), Some("862"));
        assert_eq!(first.vote_average, Some(7.7));
        assert_eq!(first.genres, vec!["Animation"]);

        let second = ExportedMovie::from_row(&table.row(1).unwrap()).unwrap();
        assert_eq!(second.id, None);
        assert_eq!(second.vote_average, None);
        assert!(second.genres.is_empty());
    }

    #[test]
    fn test_write_one_object_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.jsonl");

        assert_eq!(write_export(&table(), &path).unwrap(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["title"], "Toy Story");
        assert_eq!(first["genres"], serde_json::json!(["Animation"]));
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert!(second["vote_average"].is_null());
        assert!(second.get("id").is_none());
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.jsonl");
        std::fs::write(&path, "old content\nold content\nold content\n").unwrap();

        write_export(&table(), &path).unwrap();
        let movies = read_export(&path).unwrap();
        assert_eq!(movies.len(), 2);
    }

    #[test]
    fn test_write_missing_column_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.jsonl");
        let table = RawTable::new(vec!["title".into()], vec![vec!["Heat".into()]]).unwrap();

        let err = write_export(&table, &path).unwrap_err();
        assert!(matches!(err, DatasetError::MissingField { ref column } if column == "release_date"));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_unwritable_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("movies.jsonl");

        let err = write_export(&table(), &path).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_read_rejects_bad_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.jsonl");
        std::fs::write(
            &path,
            "{\"title\":\"A\",\"release_date\":\"\",\"vote_average\":1.0,\"genres\":[],\"overview\":\"\"}\n\nnot json\n",
        )
        .unwrap();

        let err = read_export(&path).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedInput { line: 3, .. }));
    }

    #[test]
    fn test_table_from_export_reads_like_csv() {
        let movies = vec![ExportedMovie {
            id: None,
            title: "Heat".into(),
            release_date: "1995-12-15".into(),
            vote_average: None,
            genres: vec!["Action".into(), "Crime".into()],
            overview: "".into(),
        }];

        let table = table_from_export(movies).unwrap();
        assert!(!table.has_column("id"));
        let row = table.row(0).unwrap();
        assert_eq!(row.get("vote_average"), Some(None));
        assert_eq!(
            decode_genres(row.get("genres").flatten().unwrap()),
            vec!["Action", "Crime"]
        );
    }
}
