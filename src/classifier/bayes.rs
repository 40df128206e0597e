//! The naive-Bayes classifier.
//!
//! A [`Classifier`] owns one pool per category plus the corpus, a pool
//! that receives every token trained into any category. Training updates
//! counts in both and refreshes the per-token probabilities; guessing looks
//! up the probabilities of the given tokens in every category and reduces
//! them with the active [`Combiner`].
//!
//! ```
//! use bayespool::classifier::Classifier;
//!
//! # fn main() -> bayespool::error::Result<()> {
//! let mut classifier = Classifier::new();
//! classifier.train_with_text("cheap pills, buy now", "spam")?;
//! classifier.train_with_text("meeting notes for monday", "ham")?;
//!
//! let scores = classifier.guess_with_text("buy cheap pills")?;
//! assert!(scores["spam"] > scores["ham"]);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info, warn};

use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer};
use crate::classifier::combiner::{ChiSquaredCombiner, Combiner};
use crate::classifier::config::ClassifierConfig;
use crate::classifier::pool::Pool;
use crate::classifier::probability::{ProbabilityEstimator, TokenEvidence};
use crate::classifier::stats::ClassifierStats;
use crate::error::{BayesError, Result};
use crate::storage::{self, ModelFormat, ModelSnapshot, PoolRecord};

/// Name under which the corpus is persisted. No category may use it.
pub const CORPUS_POOL_NAME: &str = "__Corpus__";

/// A trainable text classifier.
pub struct Classifier {
    corpus: Pool,
    pools: BTreeMap<String, Pool>,
    dirty: bool,
    estimator: ProbabilityEstimator,
    combiner: Arc<dyn Combiner>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Classifier {
    /// Create an empty classifier with the chi-squared combiner and the
    /// lower-casing Unicode word tokenizer.
    pub fn new() -> Self {
        Classifier {
            corpus: Pool::new(CORPUS_POOL_NAME),
            pools: BTreeMap::new(),
            dirty: false,
            estimator: ProbabilityEstimator::default(),
            combiner: Arc::new(ChiSquaredCombiner),
            tokenizer: Arc::new(UnicodeWordTokenizer::new()),
        }
    }

    /// Create an empty classifier set up from a configuration.
    pub fn with_config(config: &ClassifierConfig) -> Result<Self> {
        let mut classifier = Self::new();
        classifier.apply_config(config)?;
        Ok(classifier)
    }

    /// Replace estimator, combiner and tokenizer with the configured ones.
    ///
    /// Counts are kept. Probabilities are marked stale when the estimator
    /// changes.
    pub fn apply_config(&mut self, config: &ClassifierConfig) -> Result<()> {
        config.validate()?;
        let tokenizer = config.tokenizer.build()?;

        self.set_estimator(config.estimator)?;
        self.combiner = config.combiner.build();
        self.tokenizer = tokenizer;
        debug!(
            "Applied configuration: combiner={}, tokenizer={}",
            self.combiner.name(),
            self.tokenizer.name()
        );
        Ok(())
    }

    /// Use a different combiner.
    pub fn with_combiner<C: Combiner + 'static>(mut self, combiner: C) -> Self {
        self.combiner = Arc::new(combiner);
        self
    }

    /// Use a different tokenizer.
    pub fn with_tokenizer<T: Tokenizer + 'static>(mut self, tokenizer: T) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    pub fn combiner(&self) -> &Arc<dyn Combiner> {
        &self.combiner
    }

    pub fn set_combiner(&mut self, combiner: Arc<dyn Combiner>) {
        self.combiner = combiner;
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    pub fn set_tokenizer(&mut self, tokenizer: Arc<dyn Tokenizer>) {
        self.tokenizer = tokenizer;
    }

    pub fn estimator(&self) -> &ProbabilityEstimator {
        &self.estimator
    }

    /// Change the probability rule parameters.
    pub fn set_estimator(&mut self, estimator: ProbabilityEstimator) -> Result<()> {
        estimator.validate()?;
        if estimator != self.estimator {
            self.estimator = estimator;
            self.dirty = true;
        }
        Ok(())
    }

    /// The pool aggregating every trained token.
    pub fn corpus(&self) -> &Pool {
        &self.corpus
    }

    /// Mutable access to the corpus. Marks probabilities stale.
    pub fn corpus_mut(&mut self) -> &mut Pool {
        self.dirty = true;
        &mut self.corpus
    }

    /// Category pools in name order.
    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    /// Category names in order.
    pub fn pool_names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    /// Number of category pools.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Look up a category without creating it.
    pub fn pool(&self, name: &str) -> Option<&Pool> {
        self.pools.get(name)
    }

    /// Get a category, creating it empty if needed. Marks probabilities
    /// stale since the caller may change counts through the reference.
    pub fn pool_named(&mut self, name: &str) -> Result<&mut Pool> {
        check_pool_name(name)?;
        self.dirty = true;
        Ok(self
            .pools
            .entry(name.to_string())
            .or_insert_with(|| Pool::new(name)))
    }

    /// Remove a category. The corpus keeps the tokens it contributed.
    ///
    /// Probabilities are not recomputed and the classifier is not marked
    /// dirty: the remaining categories keep estimates made against corpus
    /// counts that still include the removed pool's tokens.
    pub fn remove_pool(&mut self, name: &str) -> Option<Pool> {
        let removed = self.pools.remove(name);
        if removed.is_some() {
            info!("Removed pool '{name}'");
        }
        removed
    }

    /// Whether counts changed since probabilities were last computed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Train a category with a token sequence.
    ///
    /// Every token is counted once per occurrence in both the category and
    /// the corpus, then probabilities are refreshed. On overflow nothing is
    /// changed.
    pub fn train<S: AsRef<str>>(&mut self, tokens: &[S], pool_name: &str) -> Result<()> {
        check_pool_name(pool_name)?;

        let mut additions: AHashMap<&str, u64> = AHashMap::new();
        for token in tokens {
            let slot = additions.entry(token.as_ref()).or_insert(0);
            // A slice longer than u64::MAX cannot exist.
            *slot += 1;
        }

        if let Some(pool) = self.pools.get(pool_name) {
            pool.check_counts(&additions)?;
        }
        self.corpus.check_counts(&additions)?;

        let pool = self
            .pools
            .entry(pool_name.to_string())
            .or_insert_with(|| Pool::new(pool_name));
        pool.add_counts(&additions)?;
        self.corpus.add_counts(&additions)?;
        self.dirty = true;

        debug!(
            "Trained '{}' with {} tokens ({} distinct)",
            pool_name,
            tokens.len(),
            additions.len()
        );

        self.update_probabilities();
        Ok(())
    }

    /// Tokenize `text` and train a category with it. Returns the number of
    /// tokens trained.
    pub fn train_with_text(&mut self, text: &str, pool_name: &str) -> Result<usize> {
        let tokens = self.tokenizer.tokenize_to_strings(text)?;
        self.train(&tokens, pool_name)?;
        Ok(tokens.len())
    }

    /// Train a category with the contents of a UTF-8 text file.
    pub fn train_with_file<P: AsRef<Path>>(&mut self, path: P, pool_name: &str) -> Result<usize> {
        let text = read_text(path.as_ref())?;
        self.train_with_text(&text, pool_name)
    }

    /// Recompute probabilities if counts changed since the last time.
    pub fn update_probabilities(&mut self) {
        if self.dirty {
            self.build_probability_cache();
        }
    }

    /// Recompute the probability of every token in every category.
    pub fn build_probability_cache(&mut self) {
        let estimator = self.estimator;
        let corpus = &self.corpus;
        let corpus_total = corpus.total_count();

        for pool in self.pools.values_mut() {
            let pool_total = pool.total_count();
            for (token, count, probability) in pool.probabilities_mut() {
                *probability = estimator.estimate(TokenEvidence {
                    pool_count: count,
                    corpus_count: corpus.count_for(token),
                    pool_total,
                    corpus_total,
                });
            }
        }

        self.dirty = false;
        debug!("Recomputed probabilities for {} pools", self.pools.len());
    }

    /// Score a token sequence against every category.
    ///
    /// Tokens unseen in a category contribute nothing to its score. The
    /// corpus is not scored.
    pub fn guess<S: AsRef<str>>(&self, tokens: &[S]) -> BTreeMap<String, f64> {
        if self.dirty {
            warn!("Guessing with out of date probabilities");
        }

        self.pools
            .iter()
            .map(|(name, pool)| {
                let probabilities = pool.probabilities_for(tokens);
                (name.clone(), self.combiner.combine(&probabilities))
            })
            .collect()
    }

    /// Tokenize `text` and score it.
    pub fn guess_with_text(&self, text: &str) -> Result<BTreeMap<String, f64>> {
        let tokens = self.tokenizer.tokenize_to_strings(text)?;
        Ok(self.guess(&tokens))
    }

    /// Score the contents of a UTF-8 text file.
    pub fn guess_with_file<P: AsRef<Path>>(&self, path: P) -> Result<BTreeMap<String, f64>> {
        let text = read_text(path.as_ref())?;
        self.guess_with_text(&text)
    }

    /// Drop every token seen fewer than `level` times in the corpus, from
    /// the corpus and from every category.
    ///
    /// Probabilities are left stale. Returns the number of tokens removed
    /// from the corpus.
    pub fn strip_to_level(&mut self, level: u64) -> usize {
        let removed = self.corpus.retain(|_, stat| stat.count >= level).len();

        let corpus = &self.corpus;
        let mut removed_from_pools = 0;
        for pool in self.pools.values_mut() {
            removed_from_pools += pool.retain(|token, _| corpus.count_for(token) >= level).len();
        }

        if removed > 0 || removed_from_pools > 0 {
            self.dirty = true;
        }
        info!(
            "Stripped to level {level}: {removed} corpus tokens, {removed_from_pools} pool entries removed"
        );
        removed
    }

    /// Summary statistics, listing the `top_n` most frequent tokens of
    /// each pool.
    pub fn stats(&self, top_n: usize) -> ClassifierStats {
        ClassifierStats {
            corpus: self.corpus.stats(top_n),
            pools: self.pools.values().map(|pool| pool.stats(top_n)).collect(),
            dirty: self.dirty,
        }
    }

    /// Counts of the corpus and every category, corpus first.
    pub fn to_snapshot(&self) -> ModelSnapshot {
        let pools = std::iter::once(&self.corpus)
            .chain(self.pools.values())
            .map(|pool| PoolRecord {
                name: pool.name().to_string(),
                tokens: pool
                    .iter()
                    .map(|(token, stat)| (token.to_string(), stat.count))
                    .collect(),
            })
            .collect();
        ModelSnapshot::new(pools)
    }

    /// Build a classifier with default strategies from saved counts.
    pub fn from_snapshot(snapshot: ModelSnapshot) -> Result<Self> {
        let mut classifier = Self::new();
        classifier.restore(snapshot)?;
        Ok(classifier)
    }

    /// Replace every count with the saved ones, keeping the strategies.
    /// On error the classifier is left untouched.
    pub fn restore(&mut self, snapshot: ModelSnapshot) -> Result<()> {
        let mut corpus = None;
        let mut pools = BTreeMap::new();

        for record in snapshot.pools {
            let pool = pool_from_record(&record)?;
            if record.name == CORPUS_POOL_NAME {
                if corpus.replace(pool).is_some() {
                    return Err(BayesError::format("Model holds more than one corpus"));
                }
            } else if pools.insert(record.name.clone(), pool).is_some() {
                return Err(BayesError::format(format!(
                    "Duplicate pool '{}' in model",
                    record.name
                )));
            }
        }

        let corpus = corpus.ok_or_else(|| BayesError::format("Model has no corpus"))?;

        self.corpus = corpus;
        self.pools = pools;
        self.dirty = true;
        self.build_probability_cache();
        Ok(())
    }

    /// Write the counts to any writer.
    pub fn save_to<W: Write>(&self, writer: W, format: ModelFormat) -> Result<W> {
        storage::write_model(&self.to_snapshot(), writer, format)
    }

    /// Replace the counts with a model read from any reader.
    pub fn load_from<R: Read>(&mut self, reader: R) -> Result<()> {
        let snapshot = storage::read_model(reader)?;
        self.restore(snapshot)
    }

    /// Atomically save the counts to a file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P, format: ModelFormat) -> Result<()> {
        storage::save_model_to_path(&self.to_snapshot(), path, format)
    }

    /// Replace the counts with a model file's.
    pub fn load_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let snapshot = storage::load_model_from_path(path)?;
        self.restore(snapshot)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("corpus_tokens", &self.corpus.len())
            .field("pools", &self.pools.keys().collect::<Vec<_>>())
            .field("dirty", &self.dirty)
            .field("estimator", &self.estimator)
            .field("combiner", &self.combiner.name())
            .field("tokenizer", &self.tokenizer.name())
            .finish()
    }
}

fn check_pool_name(name: &str) -> Result<()> {
    if name == CORPUS_POOL_NAME {
        return Err(BayesError::invalid_argument(format!(
            "'{CORPUS_POOL_NAME}' is reserved for the corpus"
        )));
    }
    Ok(())
}

fn pool_from_record(record: &PoolRecord) -> Result<Pool> {
    let mut pool = Pool::new(record.name.as_str());
    for (token, &count) in &record.tokens {
        pool.set_count(token, count).map_err(|e| {
            BayesError::format(format!("Pool '{}' cannot be restored: {e}", record.name))
        })?;
    }
    Ok(pool)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| BayesError::persistence(format!("Cannot read {}: {e}", path.display())))
}
