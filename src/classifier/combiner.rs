//! Probability combiners.
//!
//! A combiner reduces the probabilities of the tokens found in a pool to a
//! single score in `[0, 1]`. Two standard strategies are provided:
//!
//! - [`ProductCombiner`]: Robinson's geometric-mean combiner.
//! - [`ChiSquaredCombiner`]: Robinson–Fisher, which treats `-2 Σ ln p` as a
//!   chi-squared statistic. This is the classifier's default.
//!
//! Any `Fn(&[f64]) -> f64 + Send + Sync` is also a combiner:
//!
//! ```
//! use bayespool::classifier::Combiner;
//!
//! let max = |probabilities: &[f64]| probabilities.iter().cloned().fold(0.5, f64::max);
//! assert_eq!(max.combine(&[0.2, 0.9]), 0.9);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::util::math::chi_squared_survival;

/// Score returned when the input carries no information.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Strategy reducing a sequence of per-token probabilities to one score.
pub trait Combiner: Send + Sync {
    /// Combine the probabilities into a score in `[0, 1]`.
    fn combine(&self, probabilities: &[f64]) -> f64;

    /// Get the name of this combiner for debugging and logging.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Combiner for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn combine(&self, probabilities: &[f64]) -> f64 {
        self(probabilities)
    }
}

/// Sums of `ln p` and `ln (1 - p)` over the input.
fn log_sums(probabilities: &[f64]) -> (f64, f64) {
    probabilities
        .iter()
        .fold((0.0, 0.0), |(ln_p, ln_not_p), &p| {
            (ln_p + p.ln(), ln_not_p + (1.0 - p).ln())
        })
}

/// Robinson's combiner.
///
/// ```text
/// P = 1 - (Π (1 - p))^(1/n)
/// Q = 1 - (Π p)^(1/n)
/// S = (1 + (P - Q) / (P + Q)) / 2
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductCombiner;

impl Combiner for ProductCombiner {
    fn combine(&self, probabilities: &[f64]) -> f64 {
        if probabilities.is_empty() {
            return NEUTRAL_SCORE;
        }

        let n = probabilities.len() as f64;
        let (ln_p, ln_not_p) = log_sums(probabilities);
        let p = 1.0 - (ln_not_p / n).exp();
        let q = 1.0 - (ln_p / n).exp();

        let sum = p + q;
        if sum == 0.0 || !sum.is_finite() {
            return NEUTRAL_SCORE;
        }

        ((1.0 + (p - q) / sum) / 2.0).clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        "product"
    }
}

/// Robinson–Fisher combiner.
///
/// ```text
/// H = C⁻¹(-2 Σ ln p, 2n)
/// S = C⁻¹(-2 Σ ln (1 - p), 2n)
/// I = (1 + H - S) / 2
/// ```
///
/// where `C⁻¹` is the chi-squared survival function.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChiSquaredCombiner;

impl Combiner for ChiSquaredCombiner {
    fn combine(&self, probabilities: &[f64]) -> f64 {
        if probabilities.is_empty() {
            return NEUTRAL_SCORE;
        }

        let degrees_of_freedom = 2 * probabilities.len();
        let (ln_p, ln_not_p) = log_sums(probabilities);
        let h = chi_squared_survival(-2.0 * ln_p, degrees_of_freedom);
        let s = chi_squared_survival(-2.0 * ln_not_p, degrees_of_freedom);

        ((1.0 + h - s) / 2.0).clamp(0.0, 1.0)
    }

    fn name(&self) -> &str {
        "chi_squared"
    }
}

/// The standard combiners, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinerKind {
    /// [`ChiSquaredCombiner`]
    #[default]
    ChiSquared,
    /// [`ProductCombiner`]
    Product,
}

impl CombinerKind {
    /// Instantiate the combiner.
    pub fn build(self) -> Arc<dyn Combiner> {
        match self {
            CombinerKind::ChiSquared => Arc::new(ChiSquaredCombiner),
            CombinerKind::Product => Arc::new(ProductCombiner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Vec<Box<dyn Combiner>> {
        vec![Box::new(ProductCombiner), Box::new(ChiSquaredCombiner)]
    }

    #[test]
    fn test_empty_input_is_neutral() {
        for combiner in standard() {
            assert_eq!(combiner.combine(&[]), 0.5, "{}", combiner.name());
        }
    }

    #[test]
    fn test_all_half_is_neutral() {
        for combiner in standard() {
            for n in [1, 2, 7, 100, 2500] {
                let probabilities = vec![0.5; n];
                assert_eq!(combiner.combine(&probabilities), 0.5, "{} n={n}", combiner.name());
            }
        }
    }

    #[test]
    fn test_direction_of_evidence() {
        for combiner in standard() {
            let high = combiner.combine(&[0.9, 0.8, 0.95]);
            let low = combiner.combine(&[0.1, 0.2, 0.05]);
            assert!(high > 0.5, "{} gave {high}", combiner.name());
            assert!(low < 0.5, "{} gave {low}", combiner.name());
            assert!((0.0..=1.0).contains(&high));
            assert!((0.0..=1.0).contains(&low));
        }
    }

    #[test]
    fn test_single_probability_round_trips_through_chi_squared() {
        // With one token, H = p and S = 1 - p, so the score is p itself.
        for p in [0.01, 0.3, 0.75, 0.99] {
            let score = ChiSquaredCombiner.combine(&[p]);
            assert!((score - p).abs() < 1e-9, "p={p} score={score}");
        }
    }

    #[test]
    fn test_long_sequences_stay_finite() {
        let mut probabilities = vec![0.99; 3000];
        probabilities.extend(vec![0.01; 10]);
        for combiner in standard() {
            let score = combiner.combine(&probabilities);
            assert!(score.is_finite());
            assert!(score > 0.5, "{} gave {score}", combiner.name());
        }
    }

    #[test]
    fn test_extreme_values_do_not_produce_nan() {
        for combiner in standard() {
            let score = combiner.combine(&[0.0, 1.0]);
            assert!(!score.is_nan(), "{}", combiner.name());
        }
    }

    #[test]
    fn test_closure_combiner() {
        let mean = |probabilities: &[f64]| {
            if probabilities.is_empty() {
                NEUTRAL_SCORE
            } else {
                probabilities.iter().sum::<f64>() / probabilities.len() as f64
            }
        };
        let combiner: Arc<dyn Combiner> = Arc::new(mean);
        assert!((combiner.combine(&[0.2, 0.4]) - 0.3).abs() < 1e-12);
        assert_eq!(combiner.name(), "custom");
    }

    #[test]
    fn test_kind_builds_matching_combiner() {
        assert_eq!(CombinerKind::default(), CombinerKind::ChiSquared);
        assert_eq!(CombinerKind::ChiSquared.build().name(), "chi_squared");
        assert_eq!(CombinerKind::Product.build().name(), "product");
    }
}
