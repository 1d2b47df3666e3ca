//! # scopematch-core
//!
//! Journal and SDG recommendation engine for research abstracts. Holds the
//! journal corpus in a fixed-capacity flat vector store and ranks it by cosine
//! similarity against the abstract's embedding, falling back to token overlap
//! when no embedding is available.
//!
//! This is the core library crate with no async dependencies; the HTTP service,
//! the embedding provider and the single-flight corpus loader live in
//! `scopematch-server`.

/// Global configuration constants: limits, defaults, file names and scoring weights.
pub mod config;
/// Journal record types: source records, display metadata and scorability.
pub mod document;
/// Error type shared by ingestion, exclusions and query validation.
pub mod error;
/// File-backed journal exclusion list.
pub mod exclusions;
/// Validated query: abstract text, tokens, optional embedding and result count.
pub mod query;
/// SDG catalog and keyword matching.
pub mod sdg;
/// Scoring and ranking of journals and SDGs.
pub mod search;
/// Cosine and Jaccard similarity.
pub mod similarity;
/// Vector store and corpus ingestion.
pub mod storage;
/// Lexical tokenizer.
pub mod tokenizer;

pub use error::{CoreError, Result};
