use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Mean and population standard deviation of a metric across users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std: f64,
}

impl MetricSummary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            std: variance.sqrt(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    k: usize,
}

impl MetricsCalculator {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    fn hits(&self, recommended: &[Uuid], relevant: &HashSet<Uuid>) -> usize {
        recommended
            .iter()
            .take(self.k)
            .filter(|item| relevant.contains(item))
            .count()
    }

    /// Hits in the top k over the number of items actually recommended, capped at k.
    pub fn calculate_precision_at_k(&self, recommended: &[Uuid], relevant: &HashSet<Uuid>) -> f64 {
        let denominator = self.k.min(recommended.len());
        if denominator == 0 {
            return 0.0;
        }

        self.hits(recommended, relevant) as f64 / denominator as f64
    }

    pub fn calculate_recall_at_k(&self, recommended: &[Uuid], relevant: &HashSet<Uuid>) -> f64 {
        if relevant.is_empty() {
            return 0.0;
        }

        self.hits(recommended, relevant) as f64 / relevant.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_precision_and_recall() {
        let items = ids(5);
        let relevant: HashSet<Uuid> = [items[0], items[2], Uuid::new_v4()].into_iter().collect();
        let calculator = MetricsCalculator::new(4);

        // top 4 contains items[0] and items[2]
        assert!((calculator.calculate_precision_at_k(&items, &relevant) - 0.5).abs() < 1e-12);
        assert!((calculator.calculate_recall_at_k(&items, &relevant) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_recommendation_list() {
        let items = ids(2);
        let relevant: HashSet<Uuid> = [items[1]].into_iter().collect();
        let calculator = MetricsCalculator::new(10);

        assert!((calculator.calculate_precision_at_k(&items, &relevant) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        let calculator = MetricsCalculator::new(10);
        let relevant: HashSet<Uuid> = ids(3).into_iter().collect();

        assert_eq!(calculator.calculate_precision_at_k(&[], &relevant), 0.0);
        assert_eq!(calculator.calculate_recall_at_k(&ids(3), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_summary() {
        let summary = MetricSummary::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((summary.mean - 5.0).abs() < 1e-12);
        assert!((summary.std - 2.0).abs() < 1e-12);

        assert_eq!(MetricSummary::from_values(&[]), MetricSummary::default());
    }
}
