//! Classification engine.
//!
//! - [`TokenStat`] and [`Pool`] store per-category token counts and the
//!   probabilities derived from them.
//! - [`ProbabilityEstimator`] turns counts into per-token probabilities.
//! - [`Combiner`] implementations reduce the probabilities of a token
//!   sequence to one score.
//! - [`Classifier`] ties them together: training, guessing, pruning,
//!   statistics and persistence.

pub mod bayes;
pub mod combiner;
pub mod config;
pub mod pool;
pub mod probability;
pub mod stats;
pub mod token_stat;

pub use bayes::{CORPUS_POOL_NAME, Classifier};
pub use combiner::{ChiSquaredCombiner, Combiner, CombinerKind, NEUTRAL_SCORE, ProductCombiner};
pub use config::{ClassifierConfig, TokenizerConfig, TokenizerKind};
pub use pool::Pool;
pub use probability::{ProbabilityEstimator, TokenEvidence};
pub use stats::{ClassifierStats, PoolStats};
pub use token_stat::TokenStat;
