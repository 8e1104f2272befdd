use crate::error::StoreResult;
use crate::models::*;
use crate::services::store::MovieStore;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Rating descending (missing = 0), then views descending. Stable.
pub fn rank_by_popularity(movies: &mut [Movie]) {
    movies.sort_by(|a, b| {
        b.rating
            .unwrap_or(0.0)
            .partial_cmp(&a.rating.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.views.cmp(&a.views))
    });
}

pub async fn popular_movies(
    store: &dyn MovieStore,
    exclude: &HashSet<MovieId>,
    limit: usize,
) -> StoreResult<Vec<Movie>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut movies: Vec<Movie> = store
        .all()
        .await?
        .into_iter()
        .filter(|movie| !exclude.contains(&movie.id))
        .collect();

    rank_by_popularity(&mut movies);
    movies.truncate(limit);
    Ok(movies)
}
