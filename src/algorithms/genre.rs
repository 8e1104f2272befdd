use crate::models::Movie;
use std::collections::HashMap;

pub type GenreCounts = HashMap<String, u64>;
pub type GenreWeights = HashMap<String, f64>;

/// Normalizes genre counts into weights summing to one.
pub fn genre_weights(counts: &GenreCounts) -> GenreWeights {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return GenreWeights::new();
    }

    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(genre, count)| (genre.clone(), *count as f64 / total as f64))
        .collect()
}

/// Counts every genre occurrence across the given movies, one per appearance.
pub fn count_genres<'a, I>(movies: I) -> GenreCounts
where
    I: IntoIterator<Item = &'a Movie>,
{
    let mut counts = GenreCounts::new();
    for movie in movies {
        for genre in &movie.genres {
            *counts.entry(genre.clone()).or_insert(0) += 1;
        }
    }
    counts
}
