use crate::config::EvaluationConfig;
use crate::models::*;
use crate::services::recommendation::RecommendationEngine;
use crate::utils::distinct_in_order;
use crate::utils::metrics::{MetricSummary, MetricsCalculator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Where the ground-truth relevant movies for a user come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceSource {
    /// Watched movies with a high catalog rating.
    History,
    /// Movies the user rated highly.
    Ratings,
}

impl fmt::Display for RelevanceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelevanceSource::History => write!(f, "history"),
            RelevanceSource::Ratings => write!(f, "ratings"),
        }
    }
}

impl FromStr for RelevanceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "history" => Ok(RelevanceSource::History),
            "ratings" => Ok(RelevanceSource::Ratings),
            other => Err(format!("Unknown relevance source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationCase {
    pub user_id: UserId,
    pub relevant: HashSet<MovieId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub k: usize,
    pub user_count: usize,
    pub precision: MetricSummary,
    pub recall: MetricSummary,
    pub source: RelevanceSource,
    pub generated_at: DateTime<Utc>,
}

/// Offline precision@k / recall@k of the engine against held data.
pub struct Evaluator {
    engine: RecommendationEngine,
    config: EvaluationConfig,
}

impl Evaluator {
    pub fn new(engine: RecommendationEngine, config: EvaluationConfig) -> Self {
        Self { engine, config }
    }

    /// Users with enough viewing events, in order of first appearance.
    pub fn history_cases(&self, events: &[InteractionEvent], movies: &[Movie]) -> Vec<EvaluationCase> {
        let ratings: HashMap<MovieId, f64> = movies
            .iter()
            .filter_map(|movie| movie.rating.map(|rating| (movie.id, rating)))
            .collect();

        let viewing: Vec<&InteractionEvent> = events
            .iter()
            .filter(|event| event.action.is_viewing_signal())
            .collect();

        let mut per_user: HashMap<UserId, Vec<MovieId>> = HashMap::new();
        for event in &viewing {
            per_user.entry(event.user_id).or_default().push(event.movie_id);
        }

        distinct_in_order(viewing.iter().map(|event| event.user_id))
            .into_iter()
            .filter(|user_id| per_user[user_id].len() >= self.config.min_history)
            .take(self.config.max_users)
            .map(|user_id| EvaluationCase {
                user_id,
                relevant: per_user[&user_id]
                    .iter()
                    .filter(|movie_id| {
                        ratings
                            .get(*movie_id)
                            .is_some_and(|rating| *rating >= self.config.catalog_rating_threshold)
                    })
                    .copied()
                    .collect(),
            })
            .collect()
    }

    /// Users with enough explicit ratings, in order of first appearance.
    pub fn rating_cases(&self, ratings: &[UserRating]) -> Vec<EvaluationCase> {
        let mut per_user: HashMap<UserId, Vec<&UserRating>> = HashMap::new();
        for rating in ratings {
            per_user.entry(rating.user_id).or_default().push(rating);
        }

        distinct_in_order(ratings.iter().map(|rating| rating.user_id))
            .into_iter()
            .filter(|user_id| per_user[user_id].len() >= self.config.min_ratings)
            .take(self.config.max_users)
            .map(|user_id| EvaluationCase {
                user_id,
                relevant: per_user[&user_id]
                    .iter()
                    .filter(|rating| rating.rating >= self.config.user_rating_threshold)
                    .map(|rating| rating.movie_id)
                    .collect(),
            })
            .collect()
    }

    pub fn cases_for(&self, source: RelevanceSource, dataset: &Dataset) -> Vec<EvaluationCase> {
        match source {
            RelevanceSource::History => self.history_cases(&dataset.events, &dataset.movies),
            RelevanceSource::Ratings => self.rating_cases(&dataset.ratings),
        }
    }

    /// Users without recommendations or without relevant movies are skipped.
    pub async fn evaluate(&self, cases: &[EvaluationCase], source: RelevanceSource) -> EvaluationReport {
        let calculator = MetricsCalculator::new(self.config.k);
        let mut precisions = Vec::new();
        let mut recalls = Vec::new();

        for case in cases {
            if case.relevant.is_empty() {
                continue;
            }

            let recommended: Vec<MovieId> = self
                .engine
                .get_recommendations(case.user_id, self.config.k)
                .await
                .into_iter()
                .map(|movie| movie.id)
                .collect();

            if recommended.is_empty() {
                debug!("No recommendations for user {}, skipping", case.user_id);
                continue;
            }

            precisions.push(calculator.calculate_precision_at_k(&recommended, &case.relevant));
            recalls.push(calculator.calculate_recall_at_k(&recommended, &case.relevant));
        }

        let report = EvaluationReport {
            k: calculator.k(),
            user_count: precisions.len(),
            precision: MetricSummary::from_values(&precisions),
            recall: MetricSummary::from_values(&recalls),
            source,
            generated_at: Utc::now(),
        };

        info!(
            "Evaluated {} users from {}: precision@{} = {:.4}, recall@{} = {:.4}",
            report.user_count, source, report.k, report.precision.mean, report.k, report.recall.mean
        );
        report
    }
}
