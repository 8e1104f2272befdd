use super::tokenizer::TokenSet;
use crate::models::{Movie, MovieId};
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// `|A ∩ B| / |A ∪ B|`, zero when either side is empty.
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|token| large.contains(*token)).count();
    let union = a.len() + b.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedSimilarity {
    fingerprint: u64,
    similarity: f64,
}

fn fingerprint(first: Option<&str>, second: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    first.hash(&mut hasher);
    second.hash(&mut hasher);
    hasher.finish()
}

/// Memoized description similarity keyed by unordered movie pair.
///
/// Each entry remembers the descriptions it was computed from, so a movie
/// whose description changed in the catalog is recomputed on the next lookup.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    entries: DashMap<(MovieId, MovieId), CachedSimilarity>,
}

impl SimilarityCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: MovieId, b: MovieId) -> (MovieId, MovieId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn get(&self, a: MovieId, b: MovieId) -> Option<f64> {
        self.entries.get(&Self::key(a, b)).map(|entry| entry.similarity)
    }

    pub fn get_or_compute<F>(&self, a: &Movie, b: &Movie, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        let (first, second) = if a.id <= b.id { (a, b) } else { (b, a) };
        let key = (first.id, second.id);
        let stamp = fingerprint(first.description.as_deref(), second.description.as_deref());

        let hit = self
            .entries
            .get(&key)
            .filter(|entry| entry.fingerprint == stamp)
            .map(|entry| entry.similarity);
        if let Some(similarity) = hit {
            return similarity;
        }

        let similarity = compute();
        self.entries.insert(
            key,
            CachedSimilarity {
                fingerprint: stamp,
                similarity,
            },
        );
        similarity
    }

    pub fn invalidate_movie(&self, id: MovieId) {
        self.entries.retain(|(a, b), _| *a != id && *b != id);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
