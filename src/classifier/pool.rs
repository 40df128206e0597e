//! Token pool: the per-category statistics store.
//!
//! A [`Pool`] maps token text to a [`TokenStat`] and keeps a running total
//! of all counts. Every mutation goes through a method that updates the
//! total in the same step, so `total_count()` always equals the sum of the
//! individual counts.

use ahash::{AHashMap, AHashSet};

use crate::classifier::stats::PoolStats;
use crate::classifier::token_stat::TokenStat;
use crate::error::{BayesError, Result};

/// A named collection of token statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    name: String,
    tokens: AHashMap<String, TokenStat>,
    total_count: u64,
}

impl Pool {
    /// Create a new empty pool.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Pool {
            name: name.into(),
            tokens: AHashMap::new(),
            total_count: 0,
        }
    }

    /// Name of the pool.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sum of the counts of every token in the pool.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the pool holds no token.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check if a token is present.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    /// Look up the statistics of a token.
    pub fn get(&self, token: &str) -> Option<&TokenStat> {
        self.tokens.get(token)
    }

    /// Number of occurrences counted for a token, 0 if absent.
    pub fn count_for(&self, token: &str) -> u64 {
        self.tokens.get(token).map_or(0, |stat| stat.count)
    }

    /// Set the count of a token, inserting it if needed.
    ///
    /// Fails without touching the pool if the new total would overflow.
    pub fn set_count(&mut self, token: &str, count: u64) -> Result<()> {
        let previous = self.count_for(token);
        let total = (self.total_count - previous)
            .checked_add(count)
            .ok_or_else(|| BayesError::counter_overflow(token, self.total_count - previous, count))?;

        self.tokens
            .entry(token.to_string())
            .or_default()
            .count = count;
        self.total_count = total;
        Ok(())
    }

    /// Add to the count of a token, inserting it if needed.
    ///
    /// Fails with [`BayesError::CounterOverflow`] if either the token count
    /// or the pool total would exceed `u64::MAX`; the pool is left as it was.
    pub fn add_count(&mut self, token: &str, count: u64) -> Result<()> {
        let (updated, total) = self.checked_addition(token, count)?;

        self.tokens
            .entry(token.to_string())
            .or_default()
            .count = updated;
        self.total_count = total;
        Ok(())
    }

    /// Increase the count of a token by one.
    pub fn increment(&mut self, token: &str) -> Result<()> {
        self.add_count(token, 1)
    }

    /// Add a batch of counts atomically: either every addition is applied
    /// or, on overflow, none is.
    pub fn add_counts(&mut self, additions: &AHashMap<&str, u64>) -> Result<()> {
        self.check_counts(additions)?;
        for (token, &count) in additions {
            self.add_count(token, count)?;
        }
        Ok(())
    }

    /// Verify that a batch of additions would not overflow.
    pub(crate) fn check_counts(&self, additions: &AHashMap<&str, u64>) -> Result<()> {
        let mut total = self.total_count;
        for (token, &count) in additions {
            let current = self.count_for(token);
            current
                .checked_add(count)
                .ok_or_else(|| BayesError::counter_overflow(*token, current, count))?;
            total = total
                .checked_add(count)
                .ok_or_else(|| BayesError::counter_overflow(*token, total, count))?;
        }
        Ok(())
    }

    fn checked_addition(&self, token: &str, count: u64) -> Result<(u64, u64)> {
        let current = self.count_for(token);
        let updated = current
            .checked_add(count)
            .ok_or_else(|| BayesError::counter_overflow(token, current, count))?;
        let total = self
            .total_count
            .checked_add(count)
            .ok_or_else(|| BayesError::counter_overflow(token, self.total_count, count))?;
        Ok((updated, total))
    }

    /// Probability associated with a token, 0 if absent.
    pub fn probability_for(&self, token: &str) -> f64 {
        self.tokens.get(token).map_or(0.0, |stat| stat.probability)
    }

    /// Set the probability of a token already in the pool.
    ///
    /// Unlike [`Pool::set_count`] this never inserts. Returns whether the
    /// token was present.
    pub fn set_probability(&mut self, token: &str, probability: f64) -> bool {
        match self.tokens.get_mut(token) {
            Some(stat) => {
                stat.probability = probability;
                true
            }
            None => false,
        }
    }

    /// Probabilities of the given tokens, in input order.
    ///
    /// Tokens absent from the pool are skipped, so the result may be
    /// shorter than the input.
    pub fn probabilities_for<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<f64> {
        tokens
            .iter()
            .filter_map(|token| self.tokens.get(token.as_ref()))
            .map(|stat| stat.probability)
            .collect()
    }

    /// Remove a token and return its statistics.
    pub fn remove(&mut self, token: &str) -> Option<TokenStat> {
        let removed = self.tokens.remove(token)?;
        self.total_count -= removed.count;
        Some(removed)
    }

    /// Keep only the tokens for which `keep` returns true.
    ///
    /// Returns the removed tokens.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str, &TokenStat) -> bool,
    {
        let removed: Vec<String> = self
            .tokens
            .iter()
            .filter(|(token, stat)| !keep(token, stat))
            .map(|(token, _)| token.clone())
            .collect();

        for token in &removed {
            self.remove(token);
        }
        removed
    }

    /// Every token of the pool.
    pub fn all_tokens(&self) -> AHashSet<&str> {
        self.tokens.keys().map(String::as_str).collect()
    }

    /// Iterate over tokens and their statistics, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenStat)> {
        self.tokens.iter().map(|(token, stat)| (token.as_str(), stat))
    }

    /// Mutable access to the probabilities only; counts stay read-only so
    /// the total cannot drift.
    pub(crate) fn probabilities_mut(&mut self) -> impl Iterator<Item = (&str, u64, &mut f64)> {
        self.tokens
            .iter_mut()
            .map(|(token, stat)| (token.as_str(), stat.count, &mut stat.probability))
    }

    /// Basic statistics with the `top_n` most frequent tokens.
    pub fn stats(&self, top_n: usize) -> PoolStats {
        let mut ranked: Vec<(&str, &TokenStat)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.compare_count(a.1).then_with(|| a.0.cmp(b.0)));

        PoolStats {
            name: self.name.clone(),
            unique_tokens: self.len(),
            total_count: self.total_count,
            top_tokens: ranked
                .into_iter()
                .take(top_n)
                .map(|(token, stat)| (token.to_string(), stat.count, stat.probability))
                .collect(),
        }
    }
}
