use crate::error::StoreResult;
use crate::models::*;
use crate::services::store::{HistoryStore, MovieStore};
use futures::future::try_join_all;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

pub const DEFAULT_NEIGHBOR_LIMIT: usize = 50;

/// Orders aggregates by occurrence count, then average watch duration.
pub fn rank_aggregates(aggregates: &mut [MovieAggregate]) {
    aggregates.sort_by(|a, b| {
        b.occurrences.cmp(&a.occurrences).then_with(|| {
            b.avg_duration
                .partial_cmp(&a.avg_duration)
                .unwrap_or(Ordering::Equal)
        })
    });
}

/// Surfaces movies watched by users who share viewing history with the target.
pub struct NeighborFinder<'a> {
    movies: &'a dyn MovieStore,
    history: &'a dyn HistoryStore,
    neighbor_limit: usize,
}

impl<'a> NeighborFinder<'a> {
    pub fn new(movies: &'a dyn MovieStore, history: &'a dyn HistoryStore) -> Self {
        Self {
            movies,
            history,
            neighbor_limit: DEFAULT_NEIGHBOR_LIMIT,
        }
    }

    pub fn with_neighbor_limit(mut self, neighbor_limit: usize) -> Self {
        self.neighbor_limit = neighbor_limit;
        self
    }

    pub async fn generate(
        &self,
        user_id: UserId,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> StoreResult<Vec<Candidate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let watched: HashSet<MovieId> = self
            .history
            .viewing_events_for_user(user_id)
            .await?
            .into_iter()
            .map(|event| event.movie_id)
            .collect();

        if watched.is_empty() {
            return Ok(Vec::new());
        }

        let neighbors = self
            .history
            .neighbors_sharing_movies(user_id, &watched, self.neighbor_limit)
            .await?;

        if neighbors.is_empty() {
            debug!("No neighbors share viewing history with user {}", user_id);
            return Ok(Vec::new());
        }

        let neighbor_ids: HashSet<UserId> = neighbors.iter().map(|(id, _)| *id).collect();
        let mut aggregates = self
            .history
            .aggregate_viewing_by_movie(&neighbor_ids, exclude)
            .await?;

        rank_aggregates(&mut aggregates);
        aggregates.truncate(limit);

        let movies = try_join_all(
            aggregates
                .iter()
                .map(|aggregate| self.movies.find_by_id(aggregate.movie_id)),
        )
        .await?;

        // movies deleted from the catalog since being watched drop out here
        let candidates: Vec<Candidate> = aggregates
            .iter()
            .zip(movies)
            .filter_map(|(aggregate, movie)| {
                movie.map(|movie| {
                    Candidate::new(movie, aggregate.occurrences as f64, CandidateSource::Collaborative)
                })
            })
            .collect();

        debug!(
            "Neighbor finder used {} neighbors, produced {} candidates",
            neighbors.len(),
            candidates.len()
        );
        Ok(candidates)
    }
}
