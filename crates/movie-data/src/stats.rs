//! Aggregate queries over a [`MovieDataset`].
//!
//! Derived columns (release year, exploded genre) are returned as
//! standalone views computed from the table; nothing is written back onto
//! it, so repeated calls always see the same data.

use crate::dataset::MovieDataset;
use crate::error::Result;
use crate::genres::decode_genres;
use crate::types::{GENRES, MovieRecord, RELEASE_DATE, TITLE, VOTE_AVERAGE};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Number of movies [`MovieDataset::top_rated`] returns when the caller has
/// no preference
pub const DEFAULT_TOP_N: usize = 5;

/// Full-date layouts tried in order; slash dates are month-first
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

impl MovieDataset {
    /// Number of distinct titles. Empty title cells are not counted.
    pub fn unique_movie_count(&self) -> Result<usize> {
        let titles: HashSet<&str> = self.require_column(TITLE)?.flatten().collect();
        Ok(titles.len())
    }

    /// Mean `vote_average` over rows whose rating is numeric.
    ///
    /// Returns `Ok(None)` when no row has a numeric rating.
    pub fn average_rating(&self) -> Result<Option<f64>> {
        let (sum, count) = self
            .require_column(VOTE_AVERAGE)?
            .flatten()
            .filter_map(parse_rating)
            .fold((0.0, 0usize), |(sum, count), rating| (sum + rating, count + 1));

        Ok((count > 0).then(|| sum / count as f64))
    }

    /// The `top_n` highest-rated movies, best first.
    ///
    /// Equal ratings keep their source order. Rows without a numeric rating
    /// are not ranked, so the result holds `min(top_n, rated rows)` records,
    /// which can be fewer than `min(top_n, self.len())`.
    pub fn top_rated(&self, top_n: usize) -> Result<Vec<MovieRecord>> {
        let mut ranked: Vec<(usize, f64)> = self
            .require_column(VOTE_AVERAGE)?
            .enumerate()
            .filter_map(|(idx, cell)| cell.and_then(parse_rating).map(|rating| (idx, rating)))
            .collect();

        // sort_by is stable, which keeps ties in row order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_n);

        // Join back to the full row by position
        ranked
            .into_iter()
            .filter_map(|(idx, _)| self.table().row(idx))
            .map(|row| self.row_to_record(row))
            .collect()
    }

    /// Release year of every row, in row order; `None` where the date does
    /// not parse
    pub fn release_years(&self) -> Result<Vec<Option<i32>>> {
        Ok(self
            .require_column(RELEASE_DATE)?
            .map(|cell| cell.and_then(parse_release_year))
            .collect())
    }

    /// Count of movies per release year, ascending by year.
    ///
    /// Rows whose `release_date` does not parse as a date are left out.
    pub fn movies_per_year(&self) -> Result<BTreeMap<i32, usize>> {
        let years = self.release_years()?;

        let mut counts = BTreeMap::new();
        let mut skipped = 0usize;
        for year in years {
            match year {
                Some(year) => *counts.entry(year).or_insert(0) += 1,
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, "Rows without a parseable release date");
        }
        Ok(counts)
    }

    /// One `(row index, genre)` pair per genre of every row
    pub fn explode_genres(&self) -> Result<Vec<(usize, String)>> {
        Ok(self
            .require_column(GENRES)?
            .enumerate()
            .flat_map(|(idx, cell)| {
                decode_genres(cell.unwrap_or_default())
                    .into_iter()
                    .map(move |genre| (idx, genre))
            })
            .collect())
    }

    /// Count of movies per genre name
    pub fn movies_per_genre(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for (_, genre) in self.explode_genres()? {
            *counts.entry(genre).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Genre counts, most common first; ties ordered by name
    pub fn genres_by_count(&self) -> Result<Vec<(String, usize)>> {
        let mut counts: Vec<(String, usize)> = self.movies_per_genre()?.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(counts)
    }
}

/// Parse a rating cell; only finite numbers count
pub fn parse_rating(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Year of a release date, if the text is a recognizable calendar date
///
/// Accepts full dates in several layouts, date-times (RFC 3339 or
/// space-separated), `YYYY-MM` and a bare `YYYY`.
pub fn parse_release_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.year());
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.year());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.year());
        }
    }

    // Partial dates: YYYY-MM and YYYY
    let bytes = text.as_bytes();
    let is_year = |s: &[u8]| s.len() == 4 && s.iter().all(u8::is_ascii_digit);
    match bytes.len() {
        4 if is_year(bytes) => text.parse().ok(),
        7 if is_year(&bytes[..4]) && bytes[4] == b'-' => {
            NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
                .ok()
                .map(|date| date.year())
        }
        _ => None,
    }
}
