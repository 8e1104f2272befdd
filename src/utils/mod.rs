use std::collections::HashSet;
use std::hash::Hash;

pub mod metrics;
pub mod validation;

/// Deduplicates while keeping the position of each first occurrence.
pub fn distinct_in_order<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Copy,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(*item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_in_order() {
        assert_eq!(distinct_in_order([3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(distinct_in_order(Vec::<u8>::new()).is_empty());
    }
}
