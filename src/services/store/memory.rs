use super::{HistoryStore, MovieFilter, MovieStore};
use crate::error::StoreResult;
use crate::models::*;
use crate::utils::validation::validate_dataset;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

/// Catalog kept in insertion order so scans are deterministic.
#[derive(Debug, Default)]
pub struct InMemoryMovieStore {
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_movies(movies: Vec<Movie>) -> Self {
        let store = Self::new();
        for movie in movies {
            store.upsert(movie);
        }
        store
    }

    /// Replaces a movie with the same id in place, appends otherwise.
    pub fn upsert(&self, movie: Movie) {
        let mut movies = self.movies.write();
        match movies.iter_mut().find(|m| m.id == movie.id) {
            Some(existing) => *existing = movie,
            None => movies.push(movie),
        }
    }

    pub fn len(&self) -> usize {
        self.movies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.read().is_empty()
    }
}

#[async_trait::async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn find_by_id(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        Ok(self.movies.read().iter().find(|m| m.id == id).cloned())
    }

    async fn find_many(&self, filter: &MovieFilter, limit: usize) -> StoreResult<Vec<Movie>> {
        let movies = self.movies.read();
        Ok(movies
            .iter()
            .filter(|m| filter.matches(m))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn all(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.movies.read().clone())
    }
}

/// Append-only interaction log.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    events: RwLock<Vec<InteractionEvent>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<InteractionEvent>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    pub fn append(&self, event: InteractionEvent) {
        self.events.write().push(event);
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn most_recent_viewing_event(&self, user_id: UserId) -> StoreResult<Option<InteractionEvent>> {
        let events = self.events.read();
        // max_by_key keeps the last of equal timestamps, i.e. the latest appended
        Ok(events
            .iter()
            .filter(|e| e.user_id == user_id && e.action.is_viewing_signal())
            .max_by_key(|e| e.timestamp)
            .cloned())
    }

    async fn viewing_events_for_user(&self, user_id: UserId) -> StoreResult<Vec<InteractionEvent>> {
        let events = self.events.read();
        Ok(events
            .iter()
            .filter(|e| e.user_id == user_id && e.action.is_viewing_signal())
            .cloned()
            .collect())
    }

    async fn neighbors_sharing_movies(
        &self,
        user_id: UserId,
        movie_ids: &HashSet<MovieId>,
        limit: usize,
    ) -> StoreResult<Vec<(UserId, u64)>> {
        let events = self.events.read();
        let mut order: Vec<UserId> = Vec::new();
        let mut counts: HashMap<UserId, u64> = HashMap::new();

        for event in events.iter() {
            if event.user_id == user_id
                || !event.action.is_viewing_signal()
                || !movie_ids.contains(&event.movie_id)
            {
                continue;
            }

            let count = counts.entry(event.user_id).or_insert_with(|| {
                order.push(event.user_id);
                0
            });
            *count += 1;
        }

        let mut neighbors: Vec<(UserId, u64)> = order
            .into_iter()
            .map(|id| (id, counts[&id]))
            .collect();

        neighbors.sort_by(|a, b| b.1.cmp(&a.1));
        neighbors.truncate(limit);
        Ok(neighbors)
    }

    async fn aggregate_viewing_by_movie(
        &self,
        user_ids: &HashSet<UserId>,
        exclude_movie_ids: &HashSet<MovieId>,
    ) -> StoreResult<Vec<MovieAggregate>> {
        let events = self.events.read();
        let mut order: Vec<MovieId> = Vec::new();
        let mut totals: HashMap<MovieId, (u64, f64)> = HashMap::new();

        for event in events.iter() {
            if !user_ids.contains(&event.user_id)
                || !event.action.is_viewing_signal()
                || exclude_movie_ids.contains(&event.movie_id)
            {
                continue;
            }

            let entry = totals.entry(event.movie_id).or_insert_with(|| {
                order.push(event.movie_id);
                (0, 0.0)
            });
            entry.0 += 1;
            entry.1 += event.duration;
        }

        Ok(order
            .into_iter()
            .map(|movie_id| {
                let (occurrences, total_duration) = totals[&movie_id];
                MovieAggregate {
                    movie_id,
                    occurrences,
                    avg_duration: total_duration / occurrences as f64,
                }
            })
            .collect())
    }
}

/// Both stores seeded from one validated dataset.
pub struct InMemoryStores {
    pub movies: Arc<InMemoryMovieStore>,
    pub history: Arc<InMemoryHistoryStore>,
}

impl InMemoryStores {
    pub fn from_dataset(dataset: Dataset) -> anyhow::Result<Self> {
        validate_dataset(&dataset)?;

        info!(
            "Seeding in-memory stores with {} movies and {} events",
            dataset.movies.len(),
            dataset.events.len()
        );

        Ok(Self {
            movies: Arc::new(InMemoryMovieStore::from_movies(dataset.movies)),
            history: Arc::new(InMemoryHistoryStore::from_events(dataset.events)),
        })
    }

    pub fn load(path: &str) -> anyhow::Result<(Self, Vec<UserRating>)> {
        let raw = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&raw)?;
        let ratings = dataset.ratings.clone();
        Ok((Self::from_dataset(dataset)?, ratings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn ids<T: Copy + std::hash::Hash + Eq>(items: &[T]) -> HashSet<T> {
        items.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_find_many_respects_filter_and_limit() {
        let a = Movie::new("A").with_genres(["Action"]);
        let b = Movie::new("B").with_genres(["Action", "Drama"]);
        let c = Movie::new("C").with_genres(["Comedy"]);
        let store = InMemoryMovieStore::from_movies(vec![a.clone(), b.clone(), c.clone()]);

        let action = vec!["Action".to_string()];
        let filter = MovieFilter::new().with_genres(&action).excluding(&ids(&[a.id]));
        let found = store.find_many(&filter, 10).await.unwrap();
        assert_eq!(found, vec![b.clone()]);

        let limited = store.find_many(&MovieFilter::new(), 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, a.id);
    }

    #[test]
    fn test_stores_from_empty_dataset() {
        let stores = InMemoryStores::from_dataset(Dataset::default()).unwrap();
        assert!(stores.movies.is_empty());
        assert!(stores.history.is_empty());

        let movies = tokio_test::block_on(stores.movies.all()).unwrap();
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let movie = Movie::new("Old title");
        let store = InMemoryMovieStore::from_movies(vec![movie.clone(), Movie::new("Other")]);

        let mut renamed = movie.clone();
        renamed.title = "New title".to_string();
        store.upsert(renamed);

        assert_eq!(store.len(), 2);
        let all = store.all().await.unwrap();
        assert_eq!(all[0].title, "New title");
    }

    #[tokio::test]
    async fn test_most_recent_viewing_event_ignores_clicks() {
        let user = Uuid::new_v4();
        let now = Utc::now();
        let watched = Uuid::new_v4();
        let clicked = Uuid::new_v4();

        let store = InMemoryHistoryStore::from_events(vec![
            InteractionEvent::new(user, watched, ActionKind::Watch).at(now - Duration::hours(2)),
            InteractionEvent::new(user, clicked, ActionKind::Click).at(now),
        ]);

        let recent = store.most_recent_viewing_event(user).await.unwrap().unwrap();
        assert_eq!(recent.movie_id, watched);
        assert!(store.most_recent_viewing_event(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_neighbors_sorted_by_shared_count() {
        let target = Uuid::new_v4();
        let close = Uuid::new_v4();
        let far = Uuid::new_v4();
        let m1 = Uuid::new_v4();
        let m2 = Uuid::new_v4();

        let store = InMemoryHistoryStore::from_events(vec![
            InteractionEvent::new(target, m1, ActionKind::View),
            InteractionEvent::new(target, m2, ActionKind::View),
            InteractionEvent::new(far, m1, ActionKind::View),
            InteractionEvent::new(close, m1, ActionKind::Watch),
            InteractionEvent::new(close, m2, ActionKind::View),
            InteractionEvent::new(far, m2, ActionKind::Click),
        ]);

        let neighbors = store
            .neighbors_sharing_movies(target, &ids(&[m1, m2]), 50)
            .await
            .unwrap();
        assert_eq!(neighbors, vec![(close, 2), (far, 1)]);

        let capped = store
            .neighbors_sharing_movies(target, &ids(&[m1, m2]), 1)
            .await
            .unwrap();
        assert_eq!(capped, vec![(close, 2)]);
    }

    #[tokio::test]
    async fn test_aggregate_viewing_by_movie() {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let m1 = Uuid::new_v4();
        let m2 = Uuid::new_v4();

        let store = InMemoryHistoryStore::from_events(vec![
            InteractionEvent::new(u1, m1, ActionKind::View).with_duration(100.0),
            InteractionEvent::new(u2, m1, ActionKind::Watch).with_duration(300.0),
            InteractionEvent::new(u2, m2, ActionKind::View).with_duration(50.0),
            InteractionEvent::new(u1, m2, ActionKind::Click).with_duration(999.0),
        ]);

        let all = store
            .aggregate_viewing_by_movie(&ids(&[u1, u2]), &HashSet::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].movie_id, m1);
        assert_eq!(all[0].occurrences, 2);
        assert!((all[0].avg_duration - 200.0).abs() < 1e-9);
        assert_eq!(all[1].occurrences, 1);

        let excluded = store
            .aggregate_viewing_by_movie(&ids(&[u1, u2]), &ids(&[m1]))
            .await
            .unwrap();
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].movie_id, m2);
    }
}
