//! Token probability estimation.
//!
//! The raw estimate compares how frequent a token is inside a pool with how
//! frequent it is in the rest of the corpus (Graham):
//!
//! ```text
//! p(w) = f_pool(w) / (f_pool(w) + f_rest(w))
//! ```
//!
//! Rare tokens are then pulled toward an assumed probability with
//! Robinson's correction, where `n` is the corpus-wide count of the token
//! and `s` the strength of the prior:
//!
//! ```text
//! f(w) = (s * x + n * p(w)) / (s + n)
//! ```
//!
//! The result is clamped away from 0 and 1, since a single extreme value
//! would dominate either combiner.

use serde::{Deserialize, Serialize};

use crate::error::{BayesError, Result};

/// Counts describing one token in one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEvidence {
    /// Occurrences of the token in the pool.
    pub pool_count: u64,
    /// Occurrences of the token in the corpus.
    pub corpus_count: u64,
    /// Total occurrences in the pool.
    pub pool_total: u64,
    /// Total occurrences in the corpus.
    pub corpus_total: u64,
}

/// Parameters of the probability update rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilityEstimator {
    /// Weight `s` given to the assumed probability.
    pub strength: f64,
    /// Probability `x` assumed for a token never seen before.
    pub assumed_probability: f64,
    /// Lower clamp.
    pub min_probability: f64,
    /// Upper clamp.
    pub max_probability: f64,
}

impl Default for ProbabilityEstimator {
    fn default() -> Self {
        ProbabilityEstimator {
            strength: 1.0,
            assumed_probability: 0.5,
            min_probability: 0.01,
            max_probability: 0.99,
        }
    }
}

impl ProbabilityEstimator {
    /// Check `0 < min < 0.5 < max < 1`, a positive strength and an assumed
    /// probability inside the clamp range.
    pub fn validate(&self) -> Result<()> {
        let ProbabilityEstimator {
            strength,
            assumed_probability,
            min_probability,
            max_probability,
        } = *self;

        if !(min_probability > 0.0 && min_probability < 0.5) {
            return Err(BayesError::config(format!(
                "min_probability must be in (0, 0.5), got {min_probability}"
            )));
        }
        if !(max_probability > 0.5 && max_probability < 1.0) {
            return Err(BayesError::config(format!(
                "max_probability must be in (0.5, 1), got {max_probability}"
            )));
        }
        if !(strength > 0.0 && strength.is_finite()) {
            return Err(BayesError::config(format!(
                "strength must be positive, got {strength}"
            )));
        }
        if !(assumed_probability >= min_probability && assumed_probability <= max_probability) {
            return Err(BayesError::config(format!(
                "assumed_probability must be in [{min_probability}, {max_probability}], got {assumed_probability}"
            )));
        }
        Ok(())
    }

    /// Probability that text containing the token belongs to the pool.
    pub fn estimate(&self, evidence: TokenEvidence) -> f64 {
        let other_count = evidence.corpus_count.saturating_sub(evidence.pool_count) as f64;
        let other_total = evidence
            .corpus_total
            .saturating_sub(evidence.pool_total)
            .max(1) as f64;

        let pool_frequency =
            (evidence.pool_count as f64 / evidence.pool_total.max(1) as f64).min(1.0);
        let other_frequency = (other_count / other_total).min(1.0);

        let raw = if pool_frequency + other_frequency > 0.0 {
            pool_frequency / (pool_frequency + other_frequency)
        } else {
            self.assumed_probability
        };

        let n = evidence.corpus_count.max(evidence.pool_count) as f64;
        let smoothed = (self.strength * self.assumed_probability + n * raw) / (self.strength + n);

        smoothed.clamp(self.min_probability, self.max_probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(pool_count: u64, corpus_count: u64) -> TokenEvidence {
        TokenEvidence {
            pool_count,
            corpus_count,
            pool_total: 100,
            corpus_total: 200,
        }
    }

    #[test]
    fn test_default_is_valid() {
        ProbabilityEstimator::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_clamps() {
        let mut estimator = ProbabilityEstimator::default();
        estimator.min_probability = 0.0;
        assert!(estimator.validate().is_err());

        let mut estimator = ProbabilityEstimator::default();
        estimator.max_probability = 1.0;
        assert!(estimator.validate().is_err());

        let mut estimator = ProbabilityEstimator::default();
        estimator.strength = 0.0;
        assert!(estimator.validate().is_err());

        let mut estimator = ProbabilityEstimator::default();
        estimator.assumed_probability = 0.999;
        assert!(estimator.validate().is_err());
    }

    #[test]
    fn test_exclusive_token_skews_high() {
        let estimator = ProbabilityEstimator::default();
        let p = estimator.estimate(evidence(20, 20));
        assert!(p > 0.9, "got {p}");
        assert!(p <= estimator.max_probability);
    }

    #[test]
    fn test_absent_token_skews_low() {
        let estimator = ProbabilityEstimator::default();
        let p = estimator.estimate(evidence(0, 20));
        assert!(p < 0.1, "got {p}");
        assert!(p >= estimator.min_probability);
    }

    #[test]
    fn test_evenly_spread_token_is_neutral() {
        let estimator = ProbabilityEstimator::default();
        let p = estimator.estimate(evidence(10, 20));
        assert!((p - 0.5).abs() < 1e-12, "got {p}");
    }

    #[test]
    fn test_monotonic_in_pool_share() {
        let estimator = ProbabilityEstimator::default();
        let mut previous = 0.0;
        for pool_count in 0..=50 {
            let p = estimator.estimate(evidence(pool_count, 50));
            assert!(p >= previous, "not monotonic at {pool_count}");
            assert!(p >= estimator.min_probability && p <= estimator.max_probability);
            previous = p;
        }
    }

    #[test]
    fn test_single_observation_is_smoothed() {
        let estimator = ProbabilityEstimator::default();
        let p = estimator.estimate(TokenEvidence {
            pool_count: 1,
            corpus_count: 1,
            pool_total: 1,
            corpus_total: 1,
        });
        assert!((p - 0.75).abs() < 1e-12, "got {p}");
    }
}
