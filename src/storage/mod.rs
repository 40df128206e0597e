//! Model persistence.
//!
//! Models are written either in the checksummed binary layout or as JSON
//! (see [`model`]). Reading detects the layout from the leading bytes.
//! Saving to a path goes through a temporary file in the target directory
//! that is renamed over the destination once fully written, so a crash
//! never leaves a half-written model behind.

pub mod model;
pub mod structured;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{BayesError, Result};

pub use model::{MODEL_MAGIC, MODEL_VERSION, ModelSnapshot, PoolRecord};
pub use structured::{StructReader, StructWriter};

/// On-disk encoding of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    /// Compact checksummed binary layout.
    #[default]
    Binary,
    /// Human-readable JSON.
    Json,
}

/// Write a snapshot to any writer.
pub fn write_model<W: Write>(snapshot: &ModelSnapshot, writer: W, format: ModelFormat) -> Result<W> {
    match format {
        ModelFormat::Binary => snapshot.write_binary(writer),
        ModelFormat::Json => snapshot.write_json(writer, true),
    }
}

/// Read a snapshot in either format from any reader.
pub fn read_model<R: Read>(reader: R) -> Result<ModelSnapshot> {
    ModelSnapshot::read_any(reader)
}

/// Atomically save a snapshot to `path`.
pub fn save_model_to_path<P: AsRef<Path>>(
    snapshot: &ModelSnapshot,
    path: P,
    format: ModelFormat,
) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| {
        BayesError::persistence(format!("Cannot create directory {}: {e}", parent.display()))
    })?;

    let temp = NamedTempFile::new_in(parent).map_err(|e| {
        BayesError::persistence(format!(
            "Cannot create temporary file in {}: {e}",
            parent.display()
        ))
    })?;
    debug!("Writing model to temporary file {}", temp.path().display());

    let writer = write_model(snapshot, BufWriter::new(temp), format)?;
    let temp = writer
        .into_inner()
        .map_err(|e| BayesError::persistence(format!("Cannot flush model: {}", e.error())))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| BayesError::persistence(format!("Cannot sync model: {e}")))?;

    temp.persist(path).map_err(|e| {
        BayesError::persistence(format!("Cannot replace {}: {}", path.display(), e.error))
    })?;

    info!(
        "Saved {} pools to {} ({:?})",
        snapshot.pools.len(),
        path.display(),
        format
    );
    Ok(())
}

/// Load a snapshot from `path`.
pub fn load_model_from_path<P: AsRef<Path>>(path: P) -> Result<ModelSnapshot> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| BayesError::persistence(format!("Cannot open {}: {e}", path.display())))?;

    let snapshot = read_model(BufReader::new(file)).map_err(|e| match e {
        BayesError::Io(io) => {
            BayesError::persistence(format!("Cannot read {}: {io}", path.display()))
        }
        other => other,
    })?;

    info!(
        "Loaded {} pools from {}",
        snapshot.pools.len(),
        path.display()
    );
    Ok(snapshot)
}
