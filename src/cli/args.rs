//! Command line argument parsing for the bayes CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::storage::ModelFormat;

/// bayes - train and query a naive-Bayes text classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "bayes")]
#[command(about = "Train and query a naive-Bayes text classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct BayesArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Model file to read and update
    #[arg(
        short,
        long,
        env = "BAYES_MODEL",
        default_value = "bayes.model",
        value_name = "FILE",
        global = true
    )]
    pub model: PathBuf,

    /// Classifier configuration file (JSON)
    #[arg(short, long, env = "BAYES_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl BayesArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a pool with text or files
    Train(TrainArgs),

    /// Score text or files against every pool
    Guess(GuessArgs),

    /// Drop tokens seen fewer than LEVEL times
    Strip(StripArgs),

    /// Show pool statistics
    Stats(StatsArgs),

    /// Delete a pool
    #[command(name = "remove-pool")]
    RemovePool(RemovePoolArgs),
}

/// Options shared by the commands that modify the model.
#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Don't write the model back
    #[arg(long)]
    pub dry_run: bool,

    /// Encoding used when writing the model
    #[arg(long, default_value = "binary")]
    pub save_format: ModelFormat,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Pool to train
    #[arg(short, long, value_name = "NAME")]
    pub pool: String,

    /// Text to train with
    #[arg(short, long)]
    pub text: Option<String>,

    /// Files to train with
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub save: SaveArgs,
}

/// Arguments for guessing
#[derive(Parser, Debug, Clone)]
pub struct GuessArgs {
    /// Text to score
    #[arg(short, long)]
    pub text: Option<String>,

    /// Files to score, each on its own
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

/// Arguments for pruning
#[derive(Parser, Debug, Clone)]
pub struct StripArgs {
    /// Minimum corpus count a token needs to be kept
    #[arg(value_name = "LEVEL")]
    pub level: u64,

    #[command(flatten)]
    pub save: SaveArgs,
}

/// Arguments for statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// List the most frequent tokens of every pool
    #[arg(short, long)]
    pub detailed: bool,

    /// Number of tokens listed per pool with --detailed
    #[arg(long, default_value = "10")]
    pub top: usize,
}

impl StatsArgs {
    /// Number of top tokens to report.
    pub fn top_tokens(&self) -> usize {
        if self.detailed { self.top } else { 0 }
    }
}

/// Arguments for removing a pool
#[derive(Parser, Debug, Clone)]
pub struct RemovePoolArgs {
    /// Pool to delete
    #[arg(value_name = "NAME")]
    pub pool: String,

    #[command(flatten)]
    pub save: SaveArgs,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_command() {
        let args = BayesArgs::try_parse_from([
            "bayes",
            "train",
            "--pool",
            "spam",
            "mail1.txt",
            "mail2.txt",
            "--dry-run",
        ])
        .unwrap();

        if let Command::Train(train_args) = args.command {
            assert_eq!(train_args.pool, "spam");
            assert_eq!(
                train_args.files,
                vec![PathBuf::from("mail1.txt"), PathBuf::from("mail2.txt")]
            );
            assert!(train_args.text.is_none());
            assert!(train_args.save.dry_run);
            assert_eq!(train_args.save.save_format, ModelFormat::Binary);
        } else {
            panic!("Expected Train command");
        }
    }

    #[test]
    fn test_train_requires_pool() {
        assert!(BayesArgs::try_parse_from(["bayes", "train", "--text", "hello"]).is_err());
    }

    #[test]
    fn test_guess_command() {
        let args =
            BayesArgs::try_parse_from(["bayes", "guess", "--text", "cheap pills"]).unwrap();

        if let Command::Guess(guess_args) = args.command {
            assert_eq!(guess_args.text.as_deref(), Some("cheap pills"));
            assert!(guess_args.files.is_empty());
        } else {
            panic!("Expected Guess command");
        }
    }

    #[test]
    fn test_strip_command() {
        let args = BayesArgs::try_parse_from([
            "bayes",
            "strip",
            "3",
            "--save-format",
            "json",
        ])
        .unwrap();

        if let Command::Strip(strip_args) = args.command {
            assert_eq!(strip_args.level, 3);
            assert_eq!(strip_args.save.save_format, ModelFormat::Json);
        } else {
            panic!("Expected Strip command");
        }

        assert!(BayesArgs::try_parse_from(["bayes", "strip", "-1"]).is_err());
    }

    #[test]
    fn test_stats_top_tokens() {
        let args = BayesArgs::try_parse_from(["bayes", "stats"]).unwrap();
        if let Command::Stats(stats_args) = &args.command {
            assert_eq!(stats_args.top_tokens(), 0);
        }

        let args = BayesArgs::try_parse_from(["bayes", "stats", "--detailed", "--top", "5"])
            .unwrap();
        if let Command::Stats(stats_args) = &args.command {
            assert_eq!(stats_args.top_tokens(), 5);
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = BayesArgs::try_parse_from([
            "bayes",
            "remove-pool",
            "ham",
            "--model",
            "/tmp/mail.model",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.model, PathBuf::from("/tmp/mail.model"));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(matches!(args.command, Command::RemovePool(ref r) if r.pool == "ham"));
    }

    #[test]
    fn test_verbosity_levels() {
        // Default verbosity
        let args = BayesArgs::try_parse_from(["bayes", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        // Verbose flag
        let args = BayesArgs::try_parse_from(["bayes", "-v", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        // Multiple verbose flags
        let args = BayesArgs::try_parse_from(["bayes", "-vv", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        // Quiet flag
        let args = BayesArgs::try_parse_from(["bayes", "--quiet", "stats"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
