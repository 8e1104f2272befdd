pub mod collaborative;
pub mod combiner;
pub mod content;
pub mod description;
pub mod genre;
pub mod popularity;
pub mod scorer;
pub mod similarity;
pub mod tokenizer;

pub use collaborative::NeighborFinder;
pub use combiner::combine;
pub use content::ContentCandidateGenerator;
pub use description::DescriptionCandidateGenerator;
pub use genre::{count_genres, genre_weights, GenreCounts, GenreWeights};
pub use popularity::popular_movies;
pub use scorer::{final_score, score_all};
pub use similarity::{jaccard, SimilarityCache};
pub use tokenizer::{tokenize, TokenSet};

use crate::models::Candidate;
use std::cmp::Ordering;

/// Score descending. `sort_by` is stable, so equal scores keep input order.
pub fn sort_by_score_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
