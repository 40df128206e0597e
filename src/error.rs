//! Error types for the bayespool library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`BayesError`] enum.
//!
//! # Examples
//!
//! ```
//! use bayespool::error::{BayesError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(BayesError::format("unexpected end of model file"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for classifier operations.
#[derive(Error, Debug)]
pub enum BayesError {
    /// I/O errors (reading training files, model files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A count update would exceed the representable range.
    #[error("Counter overflow for token '{token}': {current} + {added} exceeds u64::MAX")]
    CounterOverflow {
        token: String,
        current: u64,
        added: u64,
    },

    /// A model could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Malformed persisted data (bad header, checksum, reserved names...).
    #[error("Format error: {0}")]
    Format(String),

    /// Analysis-related errors (tokenization)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// An error wrapped with context, printed with its whole cause chain
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with BayesError.
pub type Result<T> = std::result::Result<T, BayesError>;

impl BayesError {
    /// Create a new counter overflow error.
    pub fn counter_overflow<S: Into<String>>(token: S, current: u64, added: u64) -> Self {
        BayesError::CounterOverflow {
            token: token.into(),
            current,
            added,
        }
    }

    /// Create a new persistence error.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        BayesError::Persistence(msg.into())
    }

    /// Create a new format error.
    pub fn format<S: Into<String>>(msg: S) -> Self {
        BayesError::Format(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        BayesError::Analysis(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BayesError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        BayesError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::other(format!("Invalid argument: {}", msg.into()))
    }

    /// Whether this error came from malformed persisted data.
    pub fn is_format(&self) -> bool {
        matches!(self, BayesError::Format(_))
    }
}
