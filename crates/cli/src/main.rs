use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use movie_data::{DEFAULT_TOP_N, LoadOptions, MovieDataset, MovieRecord};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// movie-stats - descriptive statistics for a movie metadata file
#[derive(Parser)]
#[command(name = "movie-stats")]
#[command(about = "Summarize a movie metadata CSV and export it as JSON lines", long_about = None)]
struct Cli {
    /// Path to the movie metadata CSV file
    #[arg(short, long, default_value = "movies_metadata.csv")]
    data: PathBuf,

    /// Field delimiter used by the input file
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// What to report (default: summary)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every statistic, then export the dataset
    Summary {
        /// Number of top rated movies to show
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Where to write the JSON lines export
        #[arg(long, default_value = "movies_metadata.json")]
        export: PathBuf,

        /// Skip the export step
        #[arg(long)]
        no_export: bool,
    },

    /// Show the highest rated movies
    Top {
        /// Number of movies to show
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        limit: usize,
    },

    /// Show the number of movies released each year
    Years,

    /// Show the number of movies in each genre
    Genres,

    /// Write the normalized dataset as JSON lines
    Export {
        /// Destination file (overwritten if it exists)
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if !cli.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", cli.delimiter);
    }
    let options = LoadOptions::default().with_delimiter(cli.delimiter as u8);

    let start = Instant::now();
    let dataset = MovieDataset::load_with_options(&cli.data, &options)
        .with_context(|| format!("Failed to load movie data from {}", cli.data.display()))?;
    info!(elapsed = ?start.elapsed(), rows = dataset.len(), "Dataset ready");

    let command = cli.command.unwrap_or(Commands::Summary {
        top: DEFAULT_TOP_N,
        export: PathBuf::from("movies_metadata.json"),
        no_export: false,
    });

    // Dispatch to appropriate command handler
    match command {
        Commands::Summary {
            top,
            export,
            no_export,
        } => {
            handle_summary(&dataset, top)?;
            if !no_export {
                handle_export(&dataset, &export)?;
            }
        }
        Commands::Top { limit } => handle_top(&dataset, limit)?,
        Commands::Years => handle_years(&dataset)?,
        Commands::Genres => handle_genres(&dataset)?,
        Commands::Export { output } => handle_export(&dataset, &output)?,
    }

    Ok(())
}

/// Handle the 'summary' command
fn handle_summary(dataset: &MovieDataset, top: usize) -> Result<()> {
    let unique = dataset
        .unique_movie_count()
        .context("Failed to count unique movies")?;
    println!("{} {}", "Number of unique movies:".bold(), unique);

    let average = dataset
        .average_rating()
        .context("Failed to compute average rating")?;
    match average {
        Some(average) => println!("{} {:.2}", "Average rating of all movies:".bold(), average),
        None => println!("{} n/a", "Average rating of all movies:".bold()),
    }

    handle_top(dataset, top)?;
    handle_years(dataset)?;
    handle_genres(dataset)
}

/// Handle the 'top' command
fn handle_top(dataset: &MovieDataset, limit: usize) -> Result<()> {
    let movies = dataset
        .top_rated(limit)
        .context("Failed to rank movies by rating")?;

    println!("{}", format!("Top {} highest rated movies:", limit).bold().blue());
    print_movies(&movies);
    Ok(())
}

/// Handle the 'years' command
fn handle_years(dataset: &MovieDataset) -> Result<()> {
    let per_year = dataset
        .movies_per_year()
        .context("Failed to count movies per year")?;

    println!("{}", "Number of movies released each year:".bold().blue());
    for (year, count) in per_year {
        println!("  {}: {}", year.to_string().green(), count);
    }
    Ok(())
}

/// Handle the 'genres' command
fn handle_genres(dataset: &MovieDataset) -> Result<()> {
    let ranked = dataset
        .genres_by_count()
        .context("Failed to count movies per genre")?;

    println!("{}", "Number of movies in each genre:".bold().blue());
    for (genre, count) in ranked {
        println!("  {}: {}", genre.green(), count);
    }
    Ok(())
}

/// Handle the 'export' command
fn handle_export(dataset: &MovieDataset, output: &Path) -> Result<()> {
    dataset
        .export(output)
        .with_context(|| format!("Failed to export dataset to {}", output.display()))?;
    println!("{} Saved {} rows to {}", "✓".green(), dataset.len(), output.display());
    Ok(())
}

fn print_movies(movies: &[MovieRecord]) {
    for (idx, movie) in movies.iter().enumerate() {
        println!("{}. {}", (idx + 1).to_string().green(), movie.render());
    }
}
