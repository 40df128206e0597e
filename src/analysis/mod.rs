//! Text analysis for the classifier.
//!
//! Training and guessing on raw text go through a [`Tokenizer`], which
//! turns a string into an ordered stream of [`Token`]s. The classifier only
//! looks at each token's text, so any implementation of the trait can be
//! swapped in.

pub mod token;
pub mod tokenizer;

// Re-export commonly used types
pub use token::*;
pub use tokenizer::*;
