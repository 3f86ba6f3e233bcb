//! Benchmarks for the dataset aggregates
//!
//! Run with: cargo bench --package movie-data
//!
//! Uses a synthetic table shaped like `movies_metadata.csv` so no data
//! files are needed.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use movie_data::{MovieDataset, RawTable};

const GENRE_NAMES: [&str; 6] = ["Action", "Comedy", "Drama", "Family", "Horror", "Romance"];

fn synthetic_dataset(rows: usize) -> MovieDataset {
    let headers = ["title", "release_date", "vote_average", "genres", "overview"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rows = (0..rows)
        .map(|i| {
            let genres = format!(
                "[{{'id': {}, 'name': '{}'}}, {{'id': {}, 'name': '{}'}}]",
                i % 6,
                GENRE_NAMES[i % 6],
                (i + 1) % 6,
                GENRE_NAMES[(i + 1) % 6]
            );
            vec![
                format!("Movie {}", i % (rows / 2).max(1)),
                format!("{}-{:02}-{:02}", 1950 + i % 70, 1 + i % 12, 1 + i % 28),
                format!("{:.1}", (i % 100) as f64 / 10.0),
                genres,
                "An overview.".to_string(),
            ]
        })
        .collect();

    let table = RawTable::new(headers, rows).unwrap();
    MovieDataset::from_table(table)
}

fn bench_top_rated(c: &mut Criterion) {
    let dataset = synthetic_dataset(40_000);

    c.bench_function("top_rated", |b| {
        b.iter(|| {
            let top = dataset.top_rated(black_box(5)).unwrap();
            black_box(top)
        })
    });
}

fn bench_movies_per_year(c: &mut Criterion) {
    let dataset = synthetic_dataset(40_000);

    c.bench_function("movies_per_year", |b| {
        b.iter(|| black_box(dataset.movies_per_year().unwrap()))
    });
}

fn bench_movies_per_genre(c: &mut Criterion) {
    let dataset = synthetic_dataset(40_000);

    c.bench_function("movies_per_genre", |b| {
        b.iter(|| black_box(dataset.movies_per_genre().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_top_rated,
    bench_movies_per_year,
    bench_movies_per_genre
);
criterion_main!(benches);
