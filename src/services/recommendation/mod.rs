use crate::algorithms::{
    count_genres, genre_weights, popular_movies, score_all, sort_by_score_desc, tokenize,
    combine, ContentCandidateGenerator, DescriptionCandidateGenerator, NeighborFinder,
    SimilarityCache,
};
use crate::config::{PersonalizationStrategy, RecommendationConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::*;
use crate::services::store::{HistoryStore, MovieStore};
use crate::utils::distinct_in_order;
use chrono::{Datelike, Utc};
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Personalized and similar-movie recommendations over a movie store and an
/// interaction history.
///
/// The public entry points never fail. Any store error is logged and
/// answered with the popularity ranking of the whole catalog.
#[derive(Clone)]
pub struct RecommendationEngine {
    movies: Arc<dyn MovieStore>,
    history: Arc<dyn HistoryStore>,
    config: Arc<RecommendationConfig>,
    similarity_cache: Option<Arc<SimilarityCache>>,
    pinned_year: Option<i32>,
}

impl RecommendationEngine {
    pub fn new(
        movies: Arc<dyn MovieStore>,
        history: Arc<dyn HistoryStore>,
        config: Arc<RecommendationConfig>,
    ) -> Self {
        let similarity_cache = config
            .similarity_cache
            .then(|| Arc::new(SimilarityCache::new()));

        Self {
            movies,
            history,
            config,
            similarity_cache,
            pinned_year: None,
        }
    }

    pub fn with_similarity_cache(mut self, cache: Arc<SimilarityCache>) -> Self {
        self.similarity_cache = Some(cache);
        self
    }

    /// Fixes the year used for the recency bonus.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.pinned_year = Some(year);
        self
    }

    pub fn similarity_cache(&self) -> Option<&Arc<SimilarityCache>> {
        self.similarity_cache.as_ref()
    }

    /// Drops cached similarities of a movie whose description or genres changed.
    pub fn invalidate_movie(&self, movie_id: MovieId) {
        if let Some(cache) = &self.similarity_cache {
            cache.invalidate_movie(movie_id);
        }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    fn current_year(&self) -> i32 {
        self.pinned_year.unwrap_or_else(|| Utc::now().year())
    }

    pub async fn get_recommendations(&self, user_id: UserId, limit: usize) -> Vec<Movie> {
        self.recommend(user_id, limit).await.movies
    }

    pub async fn get_similar_for_movie(&self, movie: &Movie, limit: usize) -> Vec<Movie> {
        self.similar(movie, limit).await.movies
    }

    /// Personalized recommendations tagged with how they were produced.
    pub async fn recommend(&self, user_id: UserId, limit: usize) -> Recommendation {
        if limit == 0 {
            return Recommendation::empty(RecommendationKind::Personalized);
        }

        let result = match self.config.strategy {
            PersonalizationStrategy::MostRecentItem => self.most_recent_item(user_id, limit).await,
            PersonalizationStrategy::FullHistoryHybrid => {
                self.full_history_hybrid(user_id, limit).await
            }
        };

        match result {
            Ok(recommendation) => recommendation,
            Err(e) => {
                warn!("Recommendation for user {} failed, serving popular movies: {}", user_id, e);
                self.fail_soft(limit).await
            }
        }
    }

    pub async fn similar(&self, movie: &Movie, limit: usize) -> Recommendation {
        if limit == 0 {
            return Recommendation::empty(RecommendationKind::Similar);
        }

        if tokenize(movie.description.as_deref()).is_empty()
            && movie.genres.is_empty()
            && movie.tags.is_empty()
        {
            debug!("Movie {} has no description, genres or tags", movie.id);
            return Recommendation::empty(RecommendationKind::Similar);
        }

        match self.similar_chain(movie, limit).await {
            Ok(recommendation) => recommendation,
            Err(e) => {
                warn!("Similar movies for {} failed, serving popular movies: {}", movie.id, e);
                self.fail_soft(limit).await
            }
        }
    }

    /// Looks the movie up first; an unknown id is the only error surfaced.
    pub async fn similar_by_id(&self, movie_id: MovieId, limit: usize) -> EngineResult<Recommendation> {
        let movie = match self.movies.find_by_id(movie_id).await {
            Ok(Some(movie)) => movie,
            Ok(None) => return Err(EngineError::MovieNotFound(movie_id)),
            Err(e) => {
                warn!("Lookup of movie {} failed, serving popular movies: {}", movie_id, e);
                return Ok(self.fail_soft(limit).await);
            }
        };

        Ok(self.similar(&movie, limit).await)
    }

    async fn most_recent_item(&self, user_id: UserId, limit: usize) -> EngineResult<Recommendation> {
        let Some(event) = self.history.most_recent_viewing_event(user_id).await? else {
            debug!("User {} has no viewing history", user_id);
            return self.popular(&HashSet::new(), limit).await;
        };

        let Some(reference) = self.movies.find_by_id(event.movie_id).await? else {
            debug!("Last watched movie {} is no longer in the catalog", event.movie_id);
            return self.popular(&HashSet::new(), limit).await;
        };

        let exclude: HashSet<MovieId> = [reference.id].into_iter().collect();
        let candidates = self.reference_chain(&reference, &exclude, limit).await?;

        if candidates.is_empty() {
            return self.popular(&exclude, limit).await;
        }

        Ok(Recommendation::new(
            RecommendationKind::Personalized,
            self.finish(candidates, limit),
        ))
    }

    async fn full_history_hybrid(&self, user_id: UserId, limit: usize) -> EngineResult<Recommendation> {
        let events = self.history.viewing_events_for_user(user_id).await?;
        if events.is_empty() {
            debug!("User {} has no viewing history", user_id);
            return self.popular(&HashSet::new(), limit).await;
        }

        let watched_ids = distinct_in_order(events.iter().map(|event| event.movie_id));
        let watched: HashSet<MovieId> = watched_ids.iter().copied().collect();

        let records = try_join_all(watched_ids.iter().map(|id| self.movies.find_by_id(*id))).await?;
        let catalog: HashMap<MovieId, Movie> = records
            .into_iter()
            .flatten()
            .map(|movie| (movie.id, movie))
            .collect();

        // one count per viewing event, so rewatches weigh more
        let weights = genre_weights(&count_genres(
            events.iter().filter_map(|event| catalog.get(&event.movie_id)),
        ));

        let pool = limit.saturating_mul(self.config.collaborative_pool_multiplier);
        let content = ContentCandidateGenerator::new(
            self.movies.as_ref(),
            self.config.content_pool_multiplier,
        );
        let neighbors = NeighborFinder::new(self.movies.as_ref(), self.history.as_ref())
            .with_neighbor_limit(self.config.neighbor_limit);

        let (content_candidates, collaborative_candidates) = futures::try_join!(
            content.generate(&weights, &watched, pool),
            neighbors.generate(user_id, &watched, pool),
        )?;

        debug!(
            "User {}: {} content and {} collaborative candidates",
            user_id,
            content_candidates.len(),
            collaborative_candidates.len()
        );

        let combined = combine(content_candidates, collaborative_candidates, &watched);
        if combined.is_empty() {
            return self.popular(&watched, limit).await;
        }

        Ok(Recommendation::new(
            RecommendationKind::Personalized,
            self.finish(combined, limit),
        ))
    }

    async fn similar_chain(&self, movie: &Movie, limit: usize) -> EngineResult<Recommendation> {
        let exclude: HashSet<MovieId> = [movie.id].into_iter().collect();
        let candidates = self.reference_chain(movie, &exclude, limit).await?;

        if candidates.is_empty() {
            return self.popular(&exclude, limit).await;
        }

        Ok(Recommendation::new(
            RecommendationKind::Similar,
            self.finish(candidates, limit),
        ))
    }

    /// Description similarity first, the reference's own genres and tags second.
    async fn reference_chain(
        &self,
        reference: &Movie,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> EngineResult<Vec<Candidate>> {
        let pool = limit.saturating_mul(self.config.description_pool_multiplier);

        let candidates = DescriptionCandidateGenerator::new(self.movies.as_ref(), self.config.scan_limit)
            .with_cache(self.similarity_cache.as_deref())
            .generate(reference, exclude, pool)
            .await?;

        if !candidates.is_empty() {
            return Ok(candidates);
        }

        debug!("No description matches for {}, trying genres", reference.id);
        let weights = genre_weights(&count_genres([reference]));
        let candidates = ContentCandidateGenerator::new(
            self.movies.as_ref(),
            self.config.content_pool_multiplier,
        )
        .with_tags(&reference.tags)
        .generate(&weights, exclude, pool)
        .await?;

        Ok(candidates)
    }

    async fn popular(&self, exclude: &HashSet<MovieId>, limit: usize) -> EngineResult<Recommendation> {
        let movies = popular_movies(self.movies.as_ref(), exclude, limit).await?;
        Ok(Recommendation::new(RecommendationKind::Popular, movies))
    }

    async fn fail_soft(&self, limit: usize) -> Recommendation {
        match self.popular(&HashSet::new(), limit).await {
            Ok(recommendation) => recommendation,
            Err(e) => {
                warn!("Popularity fallback failed: {}", e);
                Recommendation::empty(RecommendationKind::Popular)
            }
        }
    }

    fn finish(&self, mut candidates: Vec<Candidate>, limit: usize) -> Vec<Movie> {
        score_all(&mut candidates, self.current_year());
        sort_by_score_desc(&mut candidates);
        candidates.truncate(limit);
        candidates.into_iter().map(|candidate| candidate.movie).collect()
    }
}
