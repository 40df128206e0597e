//! Per-token statistics held by a pool.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Statistics for one token within one pool.
///
/// `probability` is derived from the counts of the whole classifier and is
/// only meaningful after the classifier recomputed its probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenStat {
    /// Number of occurrences observed in the pool.
    pub count: u64,
    /// Probability that text containing the token belongs to the pool.
    pub probability: f64,
}

impl TokenStat {
    /// Create a token stat with the given count and no probability yet.
    pub fn with_count(count: u64) -> Self {
        TokenStat {
            count,
            probability: 0.0,
        }
    }

    /// Compare two stats by their counts.
    pub fn compare_count(&self, other: &TokenStat) -> Ordering {
        self.count.cmp(&other.count)
    }

    /// Compare two stats by their probabilities.
    ///
    /// Uses the IEEE total order, so the comparison is consistent even for
    /// values that never come out of the estimator (NaN, negative zero).
    pub fn compare_probability(&self, other: &TokenStat) -> Ordering {
        self.probability.total_cmp(&other.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_count() {
        let low = TokenStat::with_count(1);
        let high = TokenStat::with_count(7);

        assert_eq!(low.compare_count(&high), Ordering::Less);
        assert_eq!(high.compare_count(&low), Ordering::Greater);
        assert_eq!(low.compare_count(&TokenStat::with_count(1)), Ordering::Equal);
    }

    #[test]
    fn test_compare_probability_ignores_count() {
        let a = TokenStat {
            count: 10,
            probability: 0.2,
        };
        let b = TokenStat {
            count: 1,
            probability: 0.9,
        };
        let c = TokenStat {
            count: 3,
            probability: 0.2,
        };

        assert_eq!(a.compare_probability(&b), Ordering::Less);
        assert_eq!(b.compare_probability(&a), Ordering::Greater);
        assert_eq!(a.compare_probability(&c), Ordering::Equal);
    }

    #[test]
    fn test_sorting_by_count() {
        let mut stats = vec![
            TokenStat::with_count(3),
            TokenStat::with_count(1),
            TokenStat::with_count(2),
        ];
        stats.sort_by(|a, b| b.compare_count(a));
        let counts: Vec<u64> = stats.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
    }
}
