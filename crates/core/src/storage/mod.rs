//! Storage layer: the fixed-capacity vector store and corpus ingestion.
//!
//! Data lives in-memory in a single [`VectorStore`] filled once per process by
//! [`load_corpus`]. Nothing is persisted back to disk.

/// Streaming JSONL and legacy JSON-array ingestion.
pub mod ingest;
/// Flat vector buffer with parallel journal records.
pub mod store;

pub use ingest::{ingest_json_array, ingest_jsonl, load_corpus, CorpusSource, IngestStats};
pub use store::{Admission, VectorStore};
