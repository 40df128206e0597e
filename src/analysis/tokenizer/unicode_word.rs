//! Unicode word tokenizer implementation.
//!
//! Splits text using Unicode word boundary rules (UAX #29) and drops the
//! segments that are not words (whitespace, punctuation, symbols). This is
//! the classifier's default tokenizer.
//!
//! # Examples
//!
//! ```
//! use bayespool::analysis::tokenizer::Tokenizer;
//! use bayespool::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
//!
//! let tokenizer = UnicodeWordTokenizer::new().with_lowercase(false);
//! let tokens: Vec<_> = tokenizer.tokenize("Hello, world! 你好").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "Hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that splits text on Unicode word boundaries.
///
/// Only segments containing at least one alphanumeric character are kept,
/// so `"don't"` stays a single token while `"--"` disappears.
#[derive(Clone, Debug)]
pub struct UnicodeWordTokenizer {
    lowercase: bool,
}

impl UnicodeWordTokenizer {
    /// Create a new Unicode word tokenizer that lower-cases its output.
    pub fn new() -> Self {
        UnicodeWordTokenizer { lowercase: true }
    }

    /// Enable or disable lower-casing.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }
}

impl Default for UnicodeWordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let lowercase = self.lowercase;
        let tokens: Vec<Token> = text
            .split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(|c| c.is_alphanumeric()))
            .enumerate()
            .map(|(position, (start_offset, word))| {
                let token = Token::with_offsets(word, position, start_offset, start_offset + word.len());
                if lowercase { token.lowercased() } else { token }
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }

    fn lowercase(&self) -> bool {
        self.lowercase
    }
}
