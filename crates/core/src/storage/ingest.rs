//! Corpus ingestion into a [`VectorStore`].
//!
//! The primary source is newline-delimited JSON read one line at a time through a
//! `BufRead`, so peak memory does not depend on the file size. The legacy
//! whole-file JSON array is only used when the JSONL file is absent and is parsed
//! completely before ingestion. Both paths admit records with the same rules:
//! malformed records are skipped, records past capacity are dropped.

use crate::config;
use crate::document::{JournalMeta, JournalRecord};
use crate::error::{CoreError, Result};
use crate::storage::store::{Admission, VectorStore};
use crate::tokenizer::tokenize;
use serde::Serialize;
use serde_json::value::RawValue;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Counters reported after an ingestion pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Records stored.
    pub admitted: usize,
    /// Stored records without a usable embedding.
    pub lexical_only: usize,
    /// Records skipped because they could not be parsed or lacked an id/name.
    pub malformed: usize,
    /// Records skipped because their id was already stored.
    pub duplicates: usize,
    /// Records not stored because the store was full.
    pub dropped_over_capacity: usize,
}

/// Which file a corpus was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusSource {
    Jsonl,
    LegacyJson,
    Missing,
}

/// Admit one parsed record. `line` is only used for diagnostics.
fn ingest_record(
    record: JournalRecord,
    line: usize,
    store: &mut VectorStore,
    stats: &mut IngestStats,
) {
    let Some(id) = record.id.into_string() else {
        stats.malformed += 1;
        tracing::debug!("{}", CoreError::MalformedRecord { line, reason: "empty id".into() });
        return;
    };
    if record.name.trim().is_empty() {
        stats.malformed += 1;
        tracing::debug!("{}", CoreError::MalformedRecord { line, reason: "empty name".into() });
        return;
    }

    let tokens = tokenize(record.content.as_deref().unwrap_or(""));
    let meta = JournalMeta {
        id,
        name: record.name,
        publisher: record.publisher,
        coverage: record.coverage,
        scope: record.scope,
        link: record.link,
        asjc: record.asjc,
    };

    match store.push(meta, tokens, record.embedding.as_deref()) {
        Admission::Admitted(index) => {
            stats.admitted += 1;
            let has_embedding = store
                .entry(index as usize)
                .is_some_and(|e| e.scorability.has_embedding());
            if !has_embedding {
                stats.lexical_only += 1;
            }
        }
        Admission::Duplicate => {
            stats.duplicates += 1;
            tracing::debug!(line, "Duplicate journal id skipped");
        }
        Admission::Full => {
            stats.dropped_over_capacity += 1;
        }
    }
}

/// Stream newline-delimited records into `store`.
///
/// Invalid lines (bad JSON, bad UTF-8, missing fields) are skipped. Once the
/// store is full the remaining non-blank lines are counted but not parsed.
/// Only read errors from the underlying source are returned.
pub fn ingest_jsonl<R: BufRead>(mut reader: R, store: &mut VectorStore) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    let mut buf = Vec::with_capacity(64 * 1024);
    let mut line = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line += 1;
        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        if store.is_full() {
            if stats.dropped_over_capacity == 0 {
                tracing::warn!(
                    capacity = store.capacity(),
                    line,
                    "Corpus capacity reached, dropping remaining records"
                );
            }
            stats.dropped_over_capacity += 1;
            continue;
        }
        match serde_json::from_slice::<JournalRecord>(&buf) {
            Ok(record) => ingest_record(record, line, store, &mut stats),
            Err(e) => {
                stats.malformed += 1;
                tracing::debug!(
                    "{}",
                    CoreError::MalformedRecord {
                        line,
                        reason: e.to_string()
                    }
                );
            }
        }
    }

    Ok(stats)
}

/// Parse a whole JSON array of records, then ingest it element by element.
///
/// A file that is not a JSON array fails as a whole; individual bad elements
/// are skipped like malformed JSONL lines.
pub fn ingest_json_array<R: Read>(reader: R, store: &mut VectorStore) -> Result<IngestStats> {
    let values: Vec<Box<RawValue>> = serde_json::from_reader(reader)?;
    let mut stats = IngestStats::default();

    for (i, value) in values.into_iter().enumerate() {
        if store.is_full() {
            stats.dropped_over_capacity += 1;
            continue;
        }
        match serde_json::from_str::<JournalRecord>(value.get()) {
            Ok(record) => ingest_record(record, i + 1, store, &mut stats),
            Err(e) => {
                stats.malformed += 1;
                tracing::debug!(
                    "{}",
                    CoreError::MalformedRecord {
                        line: i + 1,
                        reason: e.to_string()
                    }
                );
            }
        }
    }
    if stats.dropped_over_capacity > 0 {
        tracing::warn!(
            capacity = store.capacity(),
            dropped = stats.dropped_over_capacity,
            "Corpus capacity reached, records dropped"
        );
    }

    Ok(stats)
}

/// Build a store from the corpus files in `data_dir`.
///
/// Prefers `journals.jsonl`, falls back to `journals.json`. When neither exists
/// the returned store is empty; that is not an error.
pub fn load_corpus(
    data_dir: &Path,
    dimension: usize,
    capacity: usize,
) -> Result<(VectorStore, IngestStats, CorpusSource)> {
    let jsonl_path = data_dir.join(config::JOURNALS_JSONL_FILE);
    let json_path = data_dir.join(config::JOURNALS_JSON_FILE);

    tracing::info!(dimension, capacity, "Allocating corpus store");
    let mut store = VectorStore::new(dimension, capacity);

    let (stats, source) = if jsonl_path.exists() {
        let file = File::open(&jsonl_path)?;
        let stats = ingest_jsonl(BufReader::with_capacity(1 << 20, file), &mut store)?;
        (stats, CorpusSource::Jsonl)
    } else if json_path.exists() {
        tracing::warn!(path = ?json_path, "Streaming corpus missing, reading legacy JSON array");
        let file = File::open(&json_path)?;
        let stats = ingest_json_array(BufReader::new(file), &mut store)?;
        (stats, CorpusSource::LegacyJson)
    } else {
        tracing::warn!("{}", CoreError::SourceMissing(jsonl_path));
        (IngestStats::default(), CorpusSource::Missing)
    };

    store.validate().map_err(|e| {
        CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("corpus store validation failed: {}", e),
        ))
    })?;

    tracing::info!(
        entries = store.len(),
        semantic = store.len() - stats.lexical_only,
        lexical_only = stats.lexical_only,
        malformed = stats.malformed,
        duplicates = stats.duplicates,
        dropped = stats.dropped_over_capacity,
        source = ?source,
        "Corpus loaded"
    );

    Ok((store, stats, source))
}
