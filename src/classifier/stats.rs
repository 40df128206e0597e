//! Summary statistics over a classifier's pools.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Statistics for one pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub name: String,
    pub unique_tokens: usize,
    pub total_count: u64,
    /// Most frequent tokens as `(token, count, probability)`.
    pub top_tokens: Vec<(String, u64, f64)>,
}

/// Statistics for a whole classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierStats {
    pub corpus: PoolStats,
    pub pools: Vec<PoolStats>,
    /// Whether the probabilities lag behind the counts.
    pub dirty: bool,
}

impl ClassifierStats {
    /// Number of category pools.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} unique tokens, {} occurrences",
            self.name, self.unique_tokens, self.total_count
        )?;
        for (token, count, probability) in &self.top_tokens {
            writeln!(f, "    {token:<24} {count:>10} {probability:>8.4}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassifierStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pools: {}", self.pools.len())?;
        if self.dirty {
            writeln!(f, "Probabilities are out of date")?;
        }
        write!(f, "{}", self.corpus)?;
        for pool in &self.pools {
            write!(f, "{pool}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let stats = ClassifierStats {
            corpus: PoolStats {
                name: "__Corpus__".to_string(),
                unique_tokens: 2,
                total_count: 5,
                top_tokens: vec![],
            },
            pools: vec![PoolStats {
                name: "spam".to_string(),
                unique_tokens: 1,
                total_count: 4,
                top_tokens: vec![("offer".to_string(), 4, 0.75)],
            }],
            dirty: true,
        };

        let text = stats.to_string();
        assert!(text.starts_with("Pools: 1\n"));
        assert!(text.contains("out of date"));
        assert!(text.contains("spam: 1 unique tokens, 4 occurrences"));
        assert!(text.contains("offer"));
        assert!(text.contains("0.7500"));
        assert_eq!(stats.pool_count(), 1);
    }
}
