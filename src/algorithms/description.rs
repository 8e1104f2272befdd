use super::similarity::{jaccard, SimilarityCache};
use super::sort_by_score_desc;
use super::tokenizer::tokenize;
use crate::error::StoreResult;
use crate::models::*;
use crate::services::store::{MovieFilter, MovieStore};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

pub const SIMILARITY_WEIGHT: f64 = 10.0;
pub const SHARED_GENRE_BONUS: f64 = 0.5;

fn shared_genres(reference: &HashSet<&str>, movie: &Movie) -> usize {
    movie
        .genres
        .iter()
        .map(String::as_str)
        .collect::<HashSet<&str>>()
        .intersection(reference)
        .count()
}

/// Scores `pool` against `reference` by description-token overlap.
///
/// Order of the returned candidates is score descending, ties in pool order.
pub fn rank_by_description(
    reference: &Movie,
    pool: &[Movie],
    exclude: &HashSet<MovieId>,
    limit: usize,
    cache: Option<&SimilarityCache>,
) -> Vec<Candidate> {
    let reference_tokens = tokenize(reference.description.as_deref());
    if reference_tokens.is_empty() || limit == 0 {
        return Vec::new();
    }

    let reference_genres: HashSet<&str> = reference.genres.iter().map(String::as_str).collect();

    let mut candidates: Vec<Candidate> = pool
        .par_iter()
        .filter(|movie| movie.id != reference.id && !exclude.contains(&movie.id))
        .filter(|movie| movie.description.as_deref().is_some_and(|d| !d.trim().is_empty()))
        .filter_map(|movie| {
            let compute = || jaccard(&reference_tokens, &tokenize(movie.description.as_deref()));
            let similarity = match cache {
                Some(cache) => cache.get_or_compute(reference, movie, compute),
                None => compute(),
            };

            if similarity <= 0.0 {
                return None;
            }

            let mut score = similarity * SIMILARITY_WEIGHT;
            if !reference_genres.is_empty() && !movie.genres.is_empty() {
                score += SHARED_GENRE_BONUS * shared_genres(&reference_genres, movie) as f64;
            }

            Some(Candidate::new(movie.clone(), score, CandidateSource::Description))
        })
        .collect();

    sort_by_score_desc(&mut candidates);
    candidates.truncate(limit);
    candidates
}

/// Finds movies whose descriptions read like a reference movie's.
pub struct DescriptionCandidateGenerator<'a> {
    movies: &'a dyn MovieStore,
    scan_limit: usize,
    cache: Option<&'a SimilarityCache>,
}

impl<'a> DescriptionCandidateGenerator<'a> {
    pub fn new(movies: &'a dyn MovieStore, scan_limit: usize) -> Self {
        Self {
            movies,
            scan_limit,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Option<&'a SimilarityCache>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn generate(
        &self,
        reference: &Movie,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> StoreResult<Vec<Candidate>> {
        if tokenize(reference.description.as_deref()).is_empty() || limit == 0 {
            debug!("Reference movie {} has no usable description", reference.id);
            return Ok(Vec::new());
        }

        let mut excluded = exclude.clone();
        excluded.insert(reference.id);
        let pool = self
            .movies
            .find_many(&MovieFilter::new().excluding(&excluded), self.scan_limit)
            .await?;

        let candidates = rank_by_description(reference, &pool, &excluded, limit, self.cache);
        debug!(
            "Description generator scanned {} movies, kept {}",
            pool.len(),
            candidates.len()
        );
        Ok(candidates)
    }
}
