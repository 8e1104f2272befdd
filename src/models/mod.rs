use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

pub type MovieId = Uuid;
pub type UserId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Catalog rating on a 0-10 scale.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    View,
    Watch,
    Click,
}

impl ActionKind {
    /// Clicks are tracked but never count as having watched a movie.
    pub fn is_viewing_signal(&self) -> bool {
        matches!(self, ActionKind::View | ActionKind::Watch)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub action: ActionKind,
    pub timestamp: DateTime<Utc>,
    /// Seconds spent on the movie.
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Explicit rating on a 0.5-5 scale.
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Content,
    Description,
    Collaborative,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub movie: Movie,
    pub score: f64,
    pub source: CandidateSource,
}

/// Aggregated viewing activity of a neighbor group for one movie.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieAggregate {
    pub movie_id: MovieId,
    pub occurrences: u64,
    pub avg_duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Personalized,
    Similar,
    Popular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub movies: Vec<Movie>,
}

/// Seed data for the in-memory stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub events: Vec<InteractionEvent>,
    #[serde(default)]
    pub ratings: Vec<UserRating>,
}

impl Movie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            genres: Vec::new(),
            tags: Vec::new(),
            rating: None,
            views: 0,
            year: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

impl InteractionEvent {
    pub fn new(user_id: UserId, movie_id: MovieId, action: ActionKind) -> Self {
        Self {
            user_id,
            movie_id,
            action,
            timestamp: Utc::now(),
            duration: 0.0,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}

impl UserRating {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
            comment: String::new(),
        }
    }
}

impl Candidate {
    pub fn new(movie: Movie, score: f64, source: CandidateSource) -> Self {
        Self { movie, score, source }
    }
}

impl Recommendation {
    pub fn new(kind: RecommendationKind, movies: Vec<Movie>) -> Self {
        Self { kind, movies }
    }

    pub fn empty(kind: RecommendationKind) -> Self {
        Self::new(kind, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewing_signal_excludes_clicks() {
        assert!(ActionKind::View.is_viewing_signal());
        assert!(ActionKind::Watch.is_viewing_signal());
        assert!(!ActionKind::Click.is_viewing_signal());
    }

    #[test]
    fn test_movie_defaults_for_missing_fields() {
        let json = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","title":"Bare"}"#;
        let movie: Movie = serde_json::from_str(json).unwrap();

        assert_eq!(movie.title, "Bare");
        assert!(movie.description.is_none());
        assert!(movie.genres.is_empty());
        assert!(movie.rating.is_none());
        assert_eq!(movie.views, 0);
        assert!(movie.year.is_none());
    }

    #[test]
    fn test_action_kind_serialization() {
        assert_eq!(serde_json::to_string(&ActionKind::Watch).unwrap(), "\"watch\"");
        let kind: ActionKind = serde_json::from_str("\"click\"").unwrap();
        assert_eq!(kind, ActionKind::Click);
    }

    #[test]
    fn test_recommendation_serializes_kind_as_type() {
        let rec = Recommendation::empty(RecommendationKind::Popular);
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["type"], "popular");
        assert_eq!(value["movies"], serde_json::json!([]));
    }
}
