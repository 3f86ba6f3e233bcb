//! Time loading a metadata file and running every aggregate once.
//!
//! Run with: cargo run --example load_timing -p movie-data -- path/to/movies_metadata.csv

use movie_data::MovieDataset;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "movies_metadata.csv".to_string());

    println!("Loading {}...\n", path);

    let start = Instant::now();
    let dataset = MovieDataset::load(&path)?;
    let load_elapsed = start.elapsed();

    let start = Instant::now();
    let unique = dataset.unique_movie_count()?;
    let _ = dataset.average_rating()?;
    let _ = dataset.top_rated(5)?;
    let years = dataset.movies_per_year()?;
    let genres = dataset.movies_per_genre()?;
    let query_elapsed = start.elapsed();

    println!("=== Load Complete ===");
    println!("Load time: {:?}", load_elapsed);
    println!("Aggregate time: {:?}", query_elapsed);
    println!("Rows: {}", dataset.len());
    println!("Unique titles: {}", unique);
    println!("Distinct years: {}", years.len());
    println!("Distinct genres: {}", genres.len());
    println!(
        "\nPerformance: {:.0} rows/second",
        dataset.len() as f64 / load_elapsed.as_secs_f64()
    );
    Ok(())
}
