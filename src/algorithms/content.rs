use super::genre::GenreWeights;
use super::sort_by_score_desc;
use crate::error::StoreResult;
use crate::models::*;
use crate::services::store::{MovieFilter, MovieStore};
use std::collections::HashSet;
use tracing::debug;

/// Rating assumed for movies without one when ranking genre candidates.
pub const DEFAULT_RATING: f64 = 5.0;

/// Genre overlap normalized by the movie's genre count, plus quality and
/// popularity nudges.
pub fn genre_overlap_score(movie: &Movie, weights: &GenreWeights) -> f64 {
    let overlap: f64 = movie
        .genres
        .iter()
        .filter_map(|genre| weights.get(genre))
        .sum();

    let normalized = overlap / movie.genres.len().max(1) as f64;
    normalized
        + 0.1 * movie.rating.unwrap_or(DEFAULT_RATING)
        + 0.05 * (movie.views as f64 + 1.0).ln()
}

/// Ranks movies by how well their genres match a weight profile.
///
/// Tags widen the store query only: a movie sharing a tag but no weighted
/// genre is still a candidate, scored on rating and views alone.
pub struct ContentCandidateGenerator<'a> {
    movies: &'a dyn MovieStore,
    pool_multiplier: usize,
    tags: &'a [String],
}

impl<'a> ContentCandidateGenerator<'a> {
    pub fn new(movies: &'a dyn MovieStore, pool_multiplier: usize) -> Self {
        Self {
            movies,
            pool_multiplier: pool_multiplier.max(1),
            tags: &[],
        }
    }

    pub fn with_tags(mut self, tags: &'a [String]) -> Self {
        self.tags = tags;
        self
    }

    pub async fn generate(
        &self,
        weights: &GenreWeights,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> StoreResult<Vec<Candidate>> {
        if (weights.is_empty() && self.tags.is_empty()) || limit == 0 {
            return Ok(Vec::new());
        }

        let filter = MovieFilter::new()
            .excluding(exclude)
            .with_genres(weights.keys())
            .with_tags(self.tags);
        let pool = self
            .movies
            .find_many(&filter, limit.saturating_mul(self.pool_multiplier))
            .await?;

        let mut candidates: Vec<Candidate> = pool
            .into_iter()
            .map(|movie| {
                let score = genre_overlap_score(&movie, weights);
                Candidate::new(movie, score, CandidateSource::Content)
            })
            .collect();

        sort_by_score_desc(&mut candidates);
        candidates.truncate(limit);

        debug!("Genre generator produced {} candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::InMemoryMovieStore;

    fn weights(pairs: &[(&str, f64)]) -> GenreWeights {
        pairs.iter().map(|(g, w)| (g.to_string(), *w)).collect()
    }

    #[test]
    fn test_score_formula() {
        let movie = Movie::new("Heat")
            .with_genres(["Crime", "Drama"])
            .with_rating(8.0)
            .with_views(99);
        let score = genre_overlap_score(&movie, &weights(&[("Crime", 0.6), ("Drama", 0.2)]));

        let expected = 0.8 / 2.0 + 0.8 + 0.05 * 100f64.ln();
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_score_defaults_for_sparse_movie() {
        let movie = Movie::new("Untitled");
        let score = genre_overlap_score(&movie, &weights(&[("Crime", 1.0)]));
        // no genres, rating defaults to 5, ln(1) = 0
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_generate_ranks_and_excludes() {
        let watched = Movie::new("Watched").with_genres(["Action"]).with_rating(9.0);
        let pure = Movie::new("Pure action").with_genres(["Action"]).with_rating(6.0);
        let mixed = Movie::new("Mixed").with_genres(["Action", "Romance"]).with_rating(6.0);
        let unrelated = Movie::new("Unrelated").with_genres(["Documentary"]).with_rating(10.0);
        let store = InMemoryMovieStore::from_movies(vec![
            watched.clone(),
            mixed.clone(),
            pure.clone(),
            unrelated,
        ]);

        let exclude: HashSet<MovieId> = [watched.id].into_iter().collect();
        let generator = ContentCandidateGenerator::new(&store, 3);
        let candidates = generator
            .generate(&weights(&[("Action", 1.0)]), &exclude, 10)
            .await
            .unwrap();

        let titles: Vec<&str> = candidates.iter().map(|c| c.movie.title.as_str()).collect();
        assert_eq!(titles, vec!["Pure action", "Mixed"]);
        assert!(candidates.iter().all(|c| c.source == CandidateSource::Content));
    }

    #[tokio::test]
    async fn test_generate_widens_pool_with_tags() {
        let action = Movie::new("Action").with_genres(["Action"]).with_rating(6.0);
        let tagged = Movie::new("Tagged")
            .with_genres(["Documentary"])
            .with_tags(["heist"])
            .with_rating(6.0);
        let unrelated = Movie::new("Unrelated").with_genres(["Documentary"]).with_rating(9.0);
        let store = InMemoryMovieStore::from_movies(vec![tagged, unrelated, action]);

        let tags = vec!["heist".to_string()];
        let candidates = ContentCandidateGenerator::new(&store, 3)
            .with_tags(&tags)
            .generate(&weights(&[("Action", 1.0)]), &HashSet::new(), 10)
            .await
            .unwrap();

        let titles: Vec<&str> = candidates.iter().map(|c| c.movie.title.as_str()).collect();
        assert_eq!(titles, vec!["Action", "Tagged"]);

        let tag_only = ContentCandidateGenerator::new(&store, 3)
            .with_tags(&tags)
            .generate(&GenreWeights::new(), &HashSet::new(), 10)
            .await
            .unwrap();
        assert_eq!(tag_only.len(), 1);
        assert_eq!(tag_only[0].movie.title, "Tagged");
    }

    #[tokio::test]
    async fn test_generate_empty_weights() {
        let store = InMemoryMovieStore::from_movies(vec![Movie::new("A").with_genres(["Action"])]);
        let generator = ContentCandidateGenerator::new(&store, 3);
        let candidates = generator
            .generate(&GenreWeights::new(), &HashSet::new(), 10)
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }
}
