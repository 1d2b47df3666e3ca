//! A validated analysis query.

use crate::config;
use crate::error::{CoreError, Result};
use crate::similarity;
use crate::tokenizer::{tokenize, TokenSet};

/// One abstract to score, with everything derived from it computed once.
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    lowered: String,
    tokens: TokenSet,
    embedding: Option<Vec<f32>>,
    embedding_norm: f64,
    top_k: usize,
}

impl Query {
    /// Builds a query from raw abstract text.
    ///
    /// `top_k` defaults to [`config::DEFAULT_TOP_K`] and is clamped into
    /// `[MIN_TOP_K, MAX_TOP_K]`. Blank or oversized text is rejected.
    pub fn new(text: &str, top_k: Option<usize>) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(CoreError::InvalidQuery("abstract must not be empty".into()));
        }
        if text.len() > config::MAX_ABSTRACT_LEN {
            return Err(CoreError::InvalidQuery(format!(
                "abstract exceeds {} bytes",
                config::MAX_ABSTRACT_LEN
            )));
        }
        Ok(Self {
            text: text.to_string(),
            lowered: text.to_lowercase(),
            tokens: tokenize(text),
            embedding: None,
            embedding_norm: 0.0,
            top_k: config::clamp_top_k(top_k.unwrap_or(config::DEFAULT_TOP_K)),
        })
    }

    /// Attaches the query embedding, if one was obtained.
    pub fn with_embedding(mut self, embedding: Option<Vec<f32>>) -> Self {
        self.embedding_norm = embedding.as_deref().map_or(0.0, similarity::norm);
        self.embedding = embedding;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased text, shared by every substring keyword test.
    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn embedding_norm(&self) -> f64 {
        self.embedding_norm
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_rejected() {
        assert!(matches!(Query::new("", None), Err(CoreError::InvalidQuery(_))));
        assert!(matches!(Query::new(" \n\t ", None), Err(CoreError::InvalidQuery(_))));
    }

    #[test]
    fn test_oversized_text_rejected() {
        let text = "a".repeat(config::MAX_ABSTRACT_LEN + 1);
        assert!(Query::new(&text, None).is_err());
    }

    #[test]
    fn test_top_k_default_and_clamp() {
        assert_eq!(Query::new("ocean", None).unwrap().top_k(), config::DEFAULT_TOP_K);
        assert_eq!(Query::new("ocean", Some(0)).unwrap().top_k(), 1);
        assert_eq!(Query::new("ocean", Some(99)).unwrap().top_k(), config::MAX_TOP_K);
    }

    #[test]
    fn test_derived_fields() {
        let q = Query::new("Marine Biology of Coral Reefs", None)
            .unwrap()
            .with_embedding(Some(vec![3.0, 4.0]));
        assert_eq!(q.lowered(), "marine biology of coral reefs");
        assert!(q.tokens().contains("marine"));
        assert!(!q.tokens().contains("of"));
        assert!((q.embedding_norm() - 5.0).abs() < 1e-9);

        let q = q.with_embedding(None);
        assert!(q.embedding().is_none());
        assert_eq!(q.embedding_norm(), 0.0);
    }
}
