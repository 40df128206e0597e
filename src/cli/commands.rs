//! Command implementations for the bayes CLI.

use std::path::PathBuf;

use anyhow::Context;
use log::{debug, info, warn};

use crate::classifier::{Classifier, ClassifierConfig};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{BayesError, Result};

/// Execute a CLI command.
pub fn execute_command(args: BayesArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args),
        Command::Guess(guess_args) => guess(guess_args, &args),
        Command::Strip(strip_args) => strip(strip_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
        Command::RemovePool(remove_args) => remove_pool(remove_args, &args),
    }
}

/// Build the classifier from the configuration and the model file.
///
/// A model file that does not exist yet yields an empty classifier.
pub fn load_classifier(cli_args: &BayesArgs) -> Result<Classifier> {
    let config = match &cli_args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            ClassifierConfig::from_json_file(path)
                .with_context(|| format!("Cannot load configuration {}", path.display()))?
        }
        None => ClassifierConfig::default(),
    };

    let mut classifier = Classifier::with_config(&config)?;
    if cli_args.model.exists() {
        classifier
            .load_from_path(&cli_args.model)
            .with_context(|| format!("Cannot load model {}", cli_args.model.display()))?;
    } else {
        info!(
            "Model {} does not exist, starting empty",
            cli_args.model.display()
        );
    }
    Ok(classifier)
}

fn save_classifier(classifier: &Classifier, save: &SaveArgs, cli_args: &BayesArgs) -> Result<bool> {
    if save.dry_run {
        info!("Dry run, not saving {}", cli_args.model.display());
        return Ok(false);
    }
    classifier.save_to_path(&cli_args.model, save.save_format)?;
    Ok(true)
}

fn require_input(text: &Option<String>, files: &[PathBuf]) -> Result<()> {
    if text.is_none() && files.is_empty() {
        return Err(BayesError::invalid_argument(
            "provide --text or at least one file",
        ));
    }
    Ok(())
}

/// Train a pool.
fn train(args: &TrainArgs, cli_args: &BayesArgs) -> Result<()> {
    require_input(&args.text, &args.files)?;
    let mut classifier = load_classifier(cli_args)?;

    let mut tokens_trained = 0;
    if let Some(text) = &args.text {
        tokens_trained += classifier.train_with_text(text, &args.pool)?;
    }
    for file in &args.files {
        let trained = classifier.train_with_file(file, &args.pool)?;
        if trained == 0 {
            warn!("No tokens found in {}", file.display());
        }
        debug!("Trained {} tokens from {}", trained, file.display());
        tokens_trained += trained;
    }

    let saved = save_classifier(&classifier, &args.save, cli_args)?;

    output_result(
        "Training complete",
        &TrainResult {
            pool: args.pool.clone(),
            sources: args.files.len() + usize::from(args.text.is_some()),
            tokens_trained,
            pool_tokens: classifier.pool(&args.pool).map_or(0, |pool| pool.len()),
            saved,
        },
        cli_args,
    )
}

/// Score inputs against every pool.
fn guess(args: &GuessArgs, cli_args: &BayesArgs) -> Result<()> {
    require_input(&args.text, &args.files)?;
    let classifier = load_classifier(cli_args)?;

    if classifier.pool_count() == 0 {
        warn!("Model {} has no pools", cli_args.model.display());
    }

    let mut reports = Vec::new();
    if let Some(text) = &args.text {
        reports.push(GuessReport::new(
            "<text>".to_string(),
            classifier.guess_with_text(text)?,
        ));
    }
    for file in &args.files {
        reports.push(GuessReport::new(
            file.display().to_string(),
            classifier.guess_with_file(file)?,
        ));
    }

    output_result("Scores", &GuessResults { reports }, cli_args)
}

/// Prune rare tokens.
fn strip(args: &StripArgs, cli_args: &BayesArgs) -> Result<()> {
    let mut classifier = load_classifier(cli_args)?;

    let tokens_removed = classifier.strip_to_level(args.level);
    classifier.update_probabilities();
    let saved = save_classifier(&classifier, &args.save, cli_args)?;

    output_result(
        "Strip complete",
        &StripResult {
            level: args.level,
            tokens_removed,
            tokens_remaining: classifier.corpus().len(),
            saved,
        },
        cli_args,
    )
}

/// Show statistics.
fn show_stats(args: &StatsArgs, cli_args: &BayesArgs) -> Result<()> {
    let classifier = load_classifier(cli_args)?;
    output_result(
        "Classifier statistics",
        &classifier.stats(args.top_tokens()),
        cli_args,
    )
}

/// Delete a pool.
fn remove_pool(args: &RemovePoolArgs, cli_args: &BayesArgs) -> Result<()> {
    let mut classifier = load_classifier(cli_args)?;

    let removed = classifier.remove_pool(&args.pool).is_some();
    let saved = if removed {
        save_classifier(&classifier, &args.save, cli_args)?
    } else {
        warn!("No pool named '{}'", args.pool);
        false
    };

    output_result(
        "Pool removal",
        &RemovePoolResult {
            pool: args.pool.clone(),
            removed,
            saved,
        },
        cli_args,
    )
}
