use crate::error::StoreError;
use crate::models::*;
use anyhow::{anyhow, Result};
use std::collections::HashSet;

pub const MIN_RELEASE_YEAR: i32 = 1900;
pub const MAX_CATALOG_RATING: f64 = 10.0;
pub const MIN_USER_RATING: f64 = 0.5;
pub const MAX_USER_RATING: f64 = 5.0;
pub const MAX_LIMIT: usize = 1000;

pub fn validate_movie(movie: &Movie) -> Result<()> {
    if movie.id.is_nil() {
        return Err(anyhow!("Movie ID cannot be nil"));
    }

    if movie.title.trim().is_empty() {
        return Err(anyhow!("Movie {} has an empty title", movie.id));
    }

    if let Some(rating) = movie.rating {
        if !rating.is_finite() || !(0.0..=MAX_CATALOG_RATING).contains(&rating) {
            return Err(anyhow!(
                "Movie {} rating must be between 0 and {}, got {}",
                movie.id,
                MAX_CATALOG_RATING,
                rating
            ));
        }
    }

    if let Some(year) = movie.year {
        if year < MIN_RELEASE_YEAR {
            return Err(anyhow!("Movie {} release year {} is before {}", movie.id, year, MIN_RELEASE_YEAR));
        }
    }

    Ok(())
}

pub fn validate_event(event: &InteractionEvent) -> Result<()> {
    if event.user_id.is_nil() {
        return Err(anyhow!("User ID cannot be nil"));
    }

    if event.movie_id.is_nil() {
        return Err(anyhow!("Movie ID cannot be nil"));
    }

    if !event.duration.is_finite() || event.duration < 0.0 {
        return Err(anyhow!("Event duration must be a non-negative number of seconds"));
    }

    Ok(())
}

pub fn validate_user_rating(rating: &UserRating) -> Result<()> {
    if rating.user_id.is_nil() || rating.movie_id.is_nil() {
        return Err(anyhow!("Rating IDs cannot be nil"));
    }

    if !rating.rating.is_finite() || !(MIN_USER_RATING..=MAX_USER_RATING).contains(&rating.rating) {
        return Err(anyhow!(
            "User rating must be between {} and {}, got {}",
            MIN_USER_RATING,
            MAX_USER_RATING,
            rating.rating
        ));
    }

    Ok(())
}

/// Checks every record plus the cross-record rules: unique movie ids and at
/// most one rating per (user, movie).
fn corrupt(id: impl ToString, reason: impl ToString) -> StoreError {
    StoreError::Corrupt {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

/// Checks every record of a dataset. The first bad record is reported as
/// [`StoreError::Corrupt`] naming the offending movie.
pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    let mut movie_ids = HashSet::new();
    for movie in &dataset.movies {
        validate_movie(movie).map_err(|e| corrupt(movie.id, e))?;
        if !movie_ids.insert(movie.id) {
            return Err(corrupt(movie.id, "duplicate movie ID").into());
        }
    }

    for event in &dataset.events {
        validate_event(event).map_err(|e| corrupt(event.movie_id, e))?;
    }

    let mut rated = HashSet::new();
    for rating in &dataset.ratings {
        validate_user_rating(rating).map_err(|e| corrupt(rating.movie_id, e))?;
        if !rated.insert((rating.user_id, rating.movie_id)) {
            return Err(corrupt(
                rating.movie_id,
                format!("rated by user {} more than once", rating.user_id),
            )
            .into());
        }
    }

    Ok(())
}

pub fn validate_limit(limit: usize) -> Result<()> {
    if limit > MAX_LIMIT {
        return Err(anyhow!("Limit too large: {} (max {})", limit, MAX_LIMIT));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validate_movie() {
        assert!(validate_movie(&Movie::new("Heat").with_rating(8.3).with_year(1995)).is_ok());
        assert!(validate_movie(&Movie::new("   ")).is_err());
        assert!(validate_movie(&Movie::new("Heat").with_rating(11.0)).is_err());
        assert!(validate_movie(&Movie::new("Heat").with_rating(f64::NAN)).is_err());
        assert!(validate_movie(&Movie::new("Heat").with_year(1850)).is_err());
    }

    #[test]
    fn test_validate_user_rating_bounds() {
        let user = Uuid::new_v4();
        let movie = Uuid::new_v4();

        assert!(validate_user_rating(&UserRating::new(user, movie, 0.5)).is_ok());
        assert!(validate_user_rating(&UserRating::new(user, movie, 5.0)).is_ok());
        assert!(validate_user_rating(&UserRating::new(user, movie, 0.0)).is_err());
        assert!(validate_user_rating(&UserRating::new(user, movie, 5.5)).is_err());
    }

    #[test]
    fn test_validate_dataset_duplicates() {
        let movie = Movie::new("Heat");
        let user = Uuid::new_v4();

        let duplicate_movies = Dataset {
            movies: vec![movie.clone(), movie.clone()],
            ..Dataset::default()
        };
        let err = validate_dataset(&duplicate_movies).unwrap_err();
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::Corrupt { id, reason }) => {
                assert_eq!(id, &movie.id.to_string());
                assert_eq!(reason, "duplicate movie ID");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let duplicate_ratings = Dataset {
            movies: vec![movie.clone()],
            events: vec![InteractionEvent::new(user, movie.id, ActionKind::View)],
            ratings: vec![
                UserRating::new(user, movie.id, 4.0),
                UserRating::new(user, movie.id, 2.0),
            ],
        };
        assert!(validate_dataset(&duplicate_ratings).is_err());

        let bad_event = Dataset {
            movies: vec![movie.clone()],
            events: vec![InteractionEvent::new(user, movie.id, ActionKind::View).with_duration(-1.0)],
            ..Dataset::default()
        };
        let err = validate_dataset(&bad_event).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Corrupt { .. })
        ));

        let valid = Dataset {
            movies: vec![movie.clone()],
            events: vec![InteractionEvent::new(user, movie.id, ActionKind::View)],
            ratings: vec![UserRating::new(user, movie.id, 4.0)],
        };
        assert!(validate_dataset(&valid).is_ok());
    }

    #[test]
    fn test_validate_event_duration() {
        let event = InteractionEvent::new(Uuid::new_v4(), Uuid::new_v4(), ActionKind::Watch);
        assert!(validate_event(&event).is_ok());
        assert!(validate_event(&event.clone().with_duration(-1.0)).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(0).is_ok());
        assert!(validate_limit(MAX_LIMIT).is_ok());
        assert!(validate_limit(MAX_LIMIT + 1).is_err());
    }
}
