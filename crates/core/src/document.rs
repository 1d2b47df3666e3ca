//! Journal record types for scopematch.
//!
//! A [`JournalRecord`] is one line of the corpus source as it arrives on disk.
//! Ingestion turns it into a [`JournalEntry`]: display metadata, the lexical token
//! set and a [`Scorability`] tag; the embedding itself moves into the store's
//! flat vector buffer.

use crate::tokenizer::TokenSet;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

/// A journal identifier as found in the source. Numeric ids are accepted and
/// normalized to their decimal string form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(serde_json::Number),
}

impl RecordId {
    /// Returns the normalized string form, or `None` for an empty id.
    pub fn into_string(self) -> Option<String> {
        let id = match self {
            RecordId::Text(s) => s.trim().to_string(),
            RecordId::Number(n) => n.to_string(),
        };
        (!id.is_empty()).then_some(id)
    }
}

/// One corpus record as read from `journals.jsonl` (or the legacy array file).
#[derive(Debug, Clone, Deserialize)]
pub struct JournalRecord {
    pub id: RecordId,
    pub name: String,
    /// `None` when absent, null, or not an array of finite numbers.
    #[serde(default, deserialize_with = "lenient_embedding")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub coverage: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// ASJC subject classification descriptions.
    #[serde(default)]
    pub asjc: Option<String>,
    /// Text the lexical token set is built from.
    #[serde(default)]
    pub content: Option<String>,
}

/// An embedding that does not decode cleanly is treated as missing rather than
/// failing the whole record: the journal is still useful for lexical scoring.
///
/// The field is captured as raw JSON first. Scanning a raw value does not
/// range-check numbers, so a component like `1e400` only invalidates the
/// embedding and not the record around it.
pub(crate) fn lenient_embedding<'de, D>(deserializer: D) -> Result<Option<Vec<f32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    Ok(parse_embedding(raw.get()))
}

/// Every component must be a number that is finite once narrowed to `f32`.
fn parse_embedding(raw: &str) -> Option<Vec<f32>> {
    let values: Vec<f64> = serde_json::from_str(raw).ok()?;
    values
        .into_iter()
        .map(|x| {
            let narrowed = x as f32;
            narrowed.is_finite().then_some(narrowed)
        })
        .collect()
}

/// Display metadata returned with every journal recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalMeta {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asjc: Option<String>,
}

/// How an entry can be scored, decided once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scorability {
    /// The entry's vector slot holds a valid embedding with this Euclidean norm.
    Semantic { norm: f64 },
    /// No usable embedding; the entry is scored by token overlap only.
    LexicalOnly,
}

impl Scorability {
    /// Precomputed norm, 0.0 for lexical-only entries.
    pub fn norm(&self) -> f64 {
        match self {
            Scorability::Semantic { norm } => *norm,
            Scorability::LexicalOnly => 0.0,
        }
    }

    /// Returns `true` if the entry has an embedding.
    pub fn has_embedding(&self) -> bool {
        matches!(self, Scorability::Semantic { .. })
    }
}

/// A journal admitted into the vector store.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub meta: JournalMeta,
    pub tokens: TokenSet,
    pub scorability: Scorability,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_full() {
        let line = r#"{"id":"j1","name":"Energy Policy","publisher":"Elsevier","embedding":[0.5,1.5],"content":"energy policy research"}"#;
        let record: JournalRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.id.into_string().as_deref(), Some("j1"));
        assert_eq!(record.name, "Energy Policy");
        assert_eq!(record.publisher.as_deref(), Some("Elsevier"));
        assert_eq!(record.embedding, Some(vec![0.5, 1.5]));
        assert!(record.coverage.is_none());
    }

    #[test]
    fn test_record_numeric_id() {
        let record: JournalRecord = serde_json::from_str(r#"{"id":42,"name":"X"}"#).unwrap();
        assert_eq!(record.id.into_string().as_deref(), Some("42"));
    }

    #[test]
    fn test_record_empty_id() {
        let record: JournalRecord = serde_json::from_str(r#"{"id":"  ","name":"X"}"#).unwrap();
        assert!(record.id.into_string().is_none());
    }

    #[test]
    fn test_record_bad_embedding_is_missing() {
        let record: JournalRecord =
            serde_json::from_str(r#"{"id":"a","name":"X","embedding":[1.0,"oops"]}"#).unwrap();
        assert!(record.embedding.is_none());
        let record: JournalRecord =
            serde_json::from_str(r#"{"id":"a","name":"X","embedding":null}"#).unwrap();
        assert!(record.embedding.is_none());
        let record: JournalRecord =
            serde_json::from_str(r#"{"id":"a","name":"X","embedding":"1,2"}"#).unwrap();
        assert!(record.embedding.is_none());
    }

    #[test]
    fn test_record_out_of_range_embedding_is_missing() {
        let record: JournalRecord =
            serde_json::from_str(r#"{"id":"a","name":"X","embedding":[1e39,0.0]}"#).unwrap();
        assert!(record.embedding.is_none());
        let record: JournalRecord =
            serde_json::from_str(r#"{"id":"a","name":"X","embedding":[1e400,0.0]}"#).unwrap();
        assert!(record.embedding.is_none());
        assert_eq!(record.name, "X");
        let record: JournalRecord =
            serde_json::from_str(r#"{"id":"a","name":"X","embedding":[2.5,-1e-50]}"#).unwrap();
        assert_eq!(record.embedding, Some(vec![2.5, 0.0]));
    }

    #[test]
    fn test_record_missing_name_fails() {
        assert!(serde_json::from_str::<JournalRecord>(r#"{"id":"a"}"#).is_err());
    }

    #[test]
    fn test_scorability_norm() {
        assert_eq!(Scorability::LexicalOnly.norm(), 0.0);
        assert_eq!(Scorability::Semantic { norm: 2.0 }.norm(), 2.0);
        assert!(Scorability::Semantic { norm: 2.0 }.has_embedding());
        assert!(!Scorability::LexicalOnly.has_embedding());
    }

    #[test]
    fn test_meta_skips_missing_fields() {
        let meta = JournalMeta {
            id: "a".into(),
            name: "A".into(),
            publisher: None,
            coverage: None,
            scope: None,
            link: Some("https://example.org".into()),
            asjc: None,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["link"], "https://example.org");
        assert!(json.get("publisher").is_none());
    }
}
