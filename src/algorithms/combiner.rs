use crate::models::*;
use std::collections::{HashMap, HashSet};

/// Multiplier applied to a content score when the collaborative list agrees.
pub const HYBRID_BOOST: f64 = 1.5;

/// Merges content and collaborative candidates by movie identity.
///
/// A movie found by both lists becomes `Hybrid` with score
/// `content * 1.5 + collaborative`. Output keeps first-seen order.
pub fn combine(
    content: Vec<Candidate>,
    collaborative: Vec<Candidate>,
    exclude: &HashSet<MovieId>,
) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::with_capacity(content.len() + collaborative.len());
    let mut positions: HashMap<MovieId, usize> = HashMap::new();

    for candidate in content {
        if exclude.contains(&candidate.movie.id) || positions.contains_key(&candidate.movie.id) {
            continue;
        }
        positions.insert(candidate.movie.id, merged.len());
        merged.push(Candidate {
            source: CandidateSource::Content,
            ..candidate
        });
    }

    for candidate in collaborative {
        if exclude.contains(&candidate.movie.id) {
            continue;
        }

        match positions.get(&candidate.movie.id) {
            Some(&index) => {
                let existing = &mut merged[index];
                existing.score = existing.score * HYBRID_BOOST + candidate.score;
                existing.source = CandidateSource::Hybrid;
            }
            None => {
                positions.insert(candidate.movie.id, merged.len());
                merged.push(Candidate {
                    source: CandidateSource::Collaborative,
                    ..candidate
                });
            }
        }
    }

    merged
}
