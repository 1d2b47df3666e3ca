//! Lexical tokenizer shared by corpus ingestion and query-time fallback scoring.
//!
//! Lowercases, strips punctuation (characters are removed, not turned into
//! separators), splits on whitespace and discards tokens of three characters or
//! fewer. The Jaccard fallback compares sets produced by this one function on both
//! sides, so ingestion and queries must never tokenize differently.

use crate::config::MIN_TOKEN_CHARS;
use std::collections::HashSet;

/// A deduplicated set of normalized tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: HashSet<String>,
}

impl TokenSet {
    /// Returns `true` if the set holds `token`.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Returns the number of distinct tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns an iterator over the tokens (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(String::as_str)
    }

    /// Approximate heap footprint in bytes.
    pub fn estimate_bytes(&self) -> usize {
        self.tokens
            .iter()
            .map(|t| t.capacity() + std::mem::size_of::<String>())
            .sum()
    }
}

impl FromIterator<String> for TokenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

/// Tokenize text: lowercase, strip punctuation, split on whitespace, drop short tokens.
pub fn tokenize(text: &str) -> TokenSet {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_owned)
        .collect()
}
