//! Output formatting for CLI commands.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::args::{BayesArgs, OutputFormat};
use crate::error::Result;

/// Result structure for training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainResult {
    pub pool: String,
    pub sources: usize,
    pub tokens_trained: usize,
    pub pool_tokens: usize,
    pub saved: bool,
}

/// Scores of one input.
#[derive(Debug, Serialize, Deserialize)]
pub struct GuessReport {
    /// File name, or `<text>` for inline text.
    pub source: String,
    pub scores: BTreeMap<String, f64>,
    /// Highest scoring pool, if any.
    pub best: Option<String>,
}

impl GuessReport {
    pub fn new(source: String, scores: BTreeMap<String, f64>) -> Self {
        let best = scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, _)| name.clone());
        GuessReport {
            source,
            scores,
            best,
        }
    }
}

/// Result structure for guessing.
#[derive(Debug, Serialize, Deserialize)]
pub struct GuessResults {
    pub reports: Vec<GuessReport>,
}

/// Result structure for pruning.
#[derive(Debug, Serialize, Deserialize)]
pub struct StripResult {
    pub level: u64,
    pub tokens_removed: usize,
    pub tokens_remaining: usize,
    pub saved: bool,
}

/// Result structure for pool removal.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovePoolResult {
    pub pool: String,
    pub removed: bool,
    pub saved: bool,
}

impl fmt::Display for TrainResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pool: {}", self.pool)?;
        writeln!(f, "Sources: {}", self.sources)?;
        writeln!(f, "Tokens trained: {}", self.tokens_trained)?;
        writeln!(f, "Distinct tokens in pool: {}", self.pool_tokens)?;
        write_saved(f, self.saved)
    }
}

impl fmt::Display for GuessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.source)?;
        if self.scores.is_empty() {
            return writeln!(f, "  (no pools)");
        }
        for (pool, score) in &self.scores {
            let marker = if self.best.as_deref() == Some(pool.as_str()) {
                "*"
            } else {
                " "
            };
            writeln!(f, "{marker} {pool:<24} {score:.6}")?;
        }
        Ok(())
    }
}

impl fmt::Display for GuessResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.reports {
            write!(f, "{report}")?;
        }
        Ok(())
    }
}

impl fmt::Display for StripResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Level: {}", self.level)?;
        writeln!(f, "Tokens removed: {}", self.tokens_removed)?;
        writeln!(f, "Tokens remaining: {}", self.tokens_remaining)?;
        write_saved(f, self.saved)
    }
}

impl fmt::Display for RemovePoolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.removed {
            writeln!(f, "Removed pool: {}", self.pool)?;
        } else {
            writeln!(f, "No pool named: {}", self.pool)?;
        }
        write_saved(f, self.saved)
    }
}

fn write_saved(f: &mut fmt::Formatter<'_>, saved: bool) -> fmt::Result {
    if saved {
        Ok(())
    } else {
        writeln!(f, "Model not saved")
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &BayesArgs) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    print!("{}", render_result(message, result, args)?);
    Ok(())
}

/// Render a result the way [`output_result`] prints it.
pub fn render_result<T>(message: &str, result: &T, args: &BayesArgs) -> Result<String>
where
    T: Serialize + fmt::Display,
{
    match args.output_format {
        OutputFormat::Human => Ok(render_human(message, result, args.verbosity())),
        OutputFormat::Json => render_json(result, args.pretty),
    }
}

fn render_human<T: fmt::Display>(message: &str, result: &T, verbosity: u8) -> String {
    if verbosity > 1 {
        format!("{message}\n\n{result}")
    } else {
        result.to_string()
    }
}

fn render_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(format!("{json}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn scores() -> BTreeMap<String, f64> {
        let mut scores = BTreeMap::new();
        scores.insert("ham".to_string(), 0.2);
        scores.insert("spam".to_string(), 0.9);
        scores
    }

    #[test]
    fn test_guess_report_picks_best() {
        let report = GuessReport::new("<text>".to_string(), scores());
        assert_eq!(report.best.as_deref(), Some("spam"));

        let rendered = report.to_string();
        assert!(rendered.contains("* spam"));
        assert!(rendered.contains("  ham"));

        let empty = GuessReport::new("<text>".to_string(), BTreeMap::new());
        assert!(empty.best.is_none());
        assert!(empty.to_string().contains("(no pools)"));
    }

    #[test]
    fn test_render_json() {
        let args = BayesArgs::try_parse_from(["bayes", "--format", "json", "stats"]).unwrap();
        let result = StripResult {
            level: 2,
            tokens_removed: 5,
            tokens_remaining: 7,
            saved: true,
        };

        let rendered = render_result("Stripped", &result, &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["tokens_removed"], 5);
        assert_eq!(value["saved"], true);
    }

    #[test]
    fn test_render_human_message_only_when_verbose() {
        let result = RemovePoolResult {
            pool: "ham".to_string(),
            removed: true,
            saved: false,
        };

        let args = BayesArgs::try_parse_from(["bayes", "stats"]).unwrap();
        let rendered = render_result("Pool removed", &result, &args).unwrap();
        assert!(!rendered.contains("Pool removed"));
        assert!(rendered.contains("Removed pool: ham"));
        assert!(rendered.contains("Model not saved"));

        let args = BayesArgs::try_parse_from(["bayes", "-vv", "stats"]).unwrap();
        let rendered = render_result("Pool removed", &result, &args).unwrap();
        assert!(rendered.starts_with("Pool removed\n\n"));
    }
}
