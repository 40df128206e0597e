//! # bayespool
//!
//! A naive-Bayes text classifier.
//!
//! ## Features
//!
//! - Per-category token statistics with overflow-checked counts
//! - Robinson-smoothed token probabilities
//! - Product and chi-squared (Fisher) probability combiners, or any closure
//! - Pluggable tokenizers
//! - Checksummed binary and JSON model files with atomic saves
//! - The `bayes` command-line tool

pub mod analysis;
pub mod classifier;
pub mod cli;
pub mod error;
pub mod storage;
pub mod util;

pub mod prelude {
    pub use crate::analysis::{Token, TokenStream, Tokenizer};
    pub use crate::classifier::{
        Classifier, ClassifierConfig, Combiner, CombinerKind, Pool, TokenStat,
    };
    pub use crate::error::{BayesError, Result};
    pub use crate::storage::ModelFormat;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
