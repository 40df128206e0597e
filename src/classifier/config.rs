//! Classifier configuration.
//!
//! Strategy choices are not part of a saved model, so a configuration is
//! the way to bring a reloaded classifier back to a customized setup:
//!
//! ```
//! use bayespool::classifier::{Classifier, ClassifierConfig};
//!
//! # fn main() -> bayespool::error::Result<()> {
//! let config = ClassifierConfig::from_json_str(
//!     r#"{ "combiner": "product", "tokenizer": { "kind": "whitespace", "lowercase": false } }"#,
//! )?;
//! let classifier = Classifier::with_config(&config)?;
//! assert_eq!(classifier.combiner().name(), "product");
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{
    RegexTokenizer, Tokenizer, UnicodeWordTokenizer, WhitespaceTokenizer,
};
use crate::classifier::combiner::CombinerKind;
use crate::classifier::probability::ProbabilityEstimator;
use crate::error::{BayesError, Result};

/// The bundled tokenizers, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    #[default]
    UnicodeWord,
    Whitespace,
    Regex,
}

/// Tokenizer selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub kind: TokenizerKind,
    /// Lower-case tokens while splitting.
    pub lowercase: bool,
    /// Pattern for [`TokenizerKind::Regex`]; `\w+` when absent.
    pub pattern: Option<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            kind: TokenizerKind::UnicodeWord,
            lowercase: true,
            pattern: None,
        }
    }
}

impl TokenizerConfig {
    /// Instantiate the configured tokenizer.
    pub fn build(&self) -> Result<Arc<dyn Tokenizer>> {
        let tokenizer: Arc<dyn Tokenizer> = match self.kind {
            TokenizerKind::UnicodeWord => {
                Arc::new(UnicodeWordTokenizer::new().with_lowercase(self.lowercase))
            }
            TokenizerKind::Whitespace => {
                Arc::new(WhitespaceTokenizer::new().with_lowercase(self.lowercase))
            }
            TokenizerKind::Regex => {
                let tokenizer = match &self.pattern {
                    Some(pattern) => RegexTokenizer::with_pattern(pattern)?,
                    None => RegexTokenizer::new()?,
                };
                Arc::new(tokenizer.with_lowercase(self.lowercase))
            }
        };
        Ok(tokenizer)
    }
}

/// Complete classifier configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Probability update parameters.
    pub estimator: ProbabilityEstimator,
    /// Combiner used when guessing.
    pub combiner: CombinerKind,
    /// Tokenizer used for text and file input.
    pub tokenizer: TokenizerConfig,
}

impl ClassifierConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ClassifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;
        if self.tokenizer.pattern.is_some() && self.tokenizer.kind != TokenizerKind::Regex {
            return Err(BayesError::config(
                "tokenizer.pattern is only meaningful with the regex tokenizer",
            ));
        }
        Ok(())
    }
}
