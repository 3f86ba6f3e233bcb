//! # Movie Data Crate
//!
//! Loads a movie metadata CSV, normalizes its semi-structured fields and
//! computes descriptive statistics over it.
//!
//! ## Main Components
//!
//! - **types**: `MovieRecord` plus the untyped `RawTable` it is projected from
//! - **parser**: read the CSV file into a `RawTable`
//! - **genres**: decode the list-of-objects `genres` column without evaluating it
//! - **dataset**: `MovieDataset`, the engine that owns the table
//! - **stats**: aggregate queries (unique titles, average rating, top-N, per year, per genre)
//! - **export**: newline-delimited JSON export and re-load
//! - **error**: error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use movie_data::MovieDataset;
//!
//! let dataset = MovieDataset::load("movies_metadata.csv")?;
//!
//! println!("Unique movies: {}", dataset.unique_movie_count()?);
//! for movie in dataset.top_rated(5)? {
//!     println!("{}", movie.render());
//! }
//! dataset.export("movies_metadata.json")?;
//! ```

pub mod dataset;
pub mod error;
pub mod export;
pub mod genres;
pub mod parser;
pub mod stats;
pub mod types;

pub use dataset::MovieDataset;
pub use error::{DatasetError, Result};
pub use export::ExportedMovie;
pub use parser::LoadOptions;
pub use stats::DEFAULT_TOP_N;
pub use types::{MovieRecord, RawTable, Row};
