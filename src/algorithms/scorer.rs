use crate::models::Candidate;

pub const RATING_WEIGHT: f64 = 0.2;
pub const POPULARITY_WEIGHT: f64 = 0.1;
pub const RECENCY_WEIGHT: f64 = 0.1;
pub const RECENCY_WINDOW_YEARS: i32 = 5;

/// Bonus for movies released within the last five years.
pub fn recency_bonus(release_year: Option<i32>, current_year: i32) -> f64 {
    match release_year {
        Some(year) => {
            // i64 so that no pair of i32 years can overflow
            let age = i64::from(current_year) - i64::from(year);
            let window = i64::from(RECENCY_WINDOW_YEARS);
            if age < window {
                RECENCY_WEIGHT * (window - age) as f64
            } else {
                0.0
            }
        }
        None => 0.0,
    }
}

pub fn final_score(candidate: &Candidate, current_year: i32) -> f64 {
    let movie = &candidate.movie;
    candidate.score
        + RATING_WEIGHT * movie.rating.unwrap_or(0.0)
        + POPULARITY_WEIGHT * (movie.views as f64 + 1.0).ln()
        + recency_bonus(movie.year, current_year)
}

/// Re-scores every candidate in place. Never drops or reorders.
pub fn score_all(candidates: &mut [Candidate], current_year: i32) {
    for candidate in candidates.iter_mut() {
        candidate.score = final_score(candidate, current_year);
    }
}
