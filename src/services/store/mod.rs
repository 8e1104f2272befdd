pub mod memory;

use crate::error::StoreResult;
use crate::models::*;
use std::collections::HashSet;

pub use memory::{InMemoryHistoryStore, InMemoryMovieStore};

/// Query filter for [`MovieStore::find_many`]. Empty sets impose no constraint.
/// When both genres and tags are given a movie matches if it shares either.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub exclude_ids: HashSet<MovieId>,
    pub genres_any: HashSet<String>,
    pub tags_any: HashSet<String>,
}

impl MovieFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn excluding(mut self, ids: &HashSet<MovieId>) -> Self {
        self.exclude_ids.extend(ids.iter().copied());
        self
    }

    pub fn with_genres<'a, I>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.genres_any.extend(genres.into_iter().cloned());
        self
    }

    pub fn with_tags<'a, I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.tags_any.extend(tags.into_iter().cloned());
        self
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        if self.exclude_ids.contains(&movie.id) {
            return false;
        }

        if self.genres_any.is_empty() && self.tags_any.is_empty() {
            return true;
        }

        movie.genres.iter().any(|g| self.genres_any.contains(g))
            || movie.tags.iter().any(|t| self.tags_any.contains(t))
    }
}

#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    async fn find_by_id(&self, id: MovieId) -> StoreResult<Option<Movie>>;
    async fn find_many(&self, filter: &MovieFilter, limit: usize) -> StoreResult<Vec<Movie>>;
    async fn all(&self) -> StoreResult<Vec<Movie>>;
}

#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Latest view/watch event of the user, clicks ignored.
    async fn most_recent_viewing_event(&self, user_id: UserId) -> StoreResult<Option<InteractionEvent>>;

    async fn viewing_events_for_user(&self, user_id: UserId) -> StoreResult<Vec<InteractionEvent>>;

    /// Other users who viewed any of `movie_ids`, with the number of matching
    /// viewing events, sorted by that count descending and capped at `limit`.
    async fn neighbors_sharing_movies(
        &self,
        user_id: UserId,
        movie_ids: &HashSet<MovieId>,
        limit: usize,
    ) -> StoreResult<Vec<(UserId, u64)>>;

    /// Viewing activity of `user_ids` grouped per movie, skipping `exclude_movie_ids`.
    async fn aggregate_viewing_by_movie(
        &self,
        user_ids: &HashSet<UserId>,
        exclude_movie_ids: &HashSet<MovieId>,
    ) -> StoreResult<Vec<MovieAggregate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_excludes_ids() {
        let movie = Movie::new("Heat").with_genres(["Crime"]);
        let excluded: HashSet<MovieId> = [movie.id].into_iter().collect();

        assert!(MovieFilter::new().matches(&movie));
        assert!(!MovieFilter::new().excluding(&excluded).matches(&movie));
    }

    #[test]
    fn test_filter_matches_genre_or_tag() {
        let movie = Movie::new("Alien")
            .with_genres(["Horror", "Science Fiction"])
            .with_tags(["space"]);

        let horror = vec!["Horror".to_string()];
        let drama = vec!["Drama".to_string()];
        let space = vec!["space".to_string()];
        let ocean = vec!["ocean".to_string()];

        assert!(MovieFilter::new().with_genres(&horror).matches(&movie));
        assert!(!MovieFilter::new().with_genres(&drama).matches(&movie));
        assert!(MovieFilter::new().with_tags(&space).matches(&movie));
        assert!(!MovieFilter::new().with_tags(&ocean).matches(&movie));
        assert!(MovieFilter::new().with_genres(&drama).with_tags(&space).matches(&movie));
        assert!(!MovieFilter::new().with_genres(&drama).with_tags(&ocean).matches(&movie));
    }
}
