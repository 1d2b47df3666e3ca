//! Sustainable Development Goal catalog.
//!
//! The catalog is small (the 17 UN goals, give or take) and loaded once. Norms are
//! precomputed and every keyword is compiled into a [`KeywordMatcher`] at load time,
//! so per-query scoring only reads the catalog.

use crate::config;
use crate::document::lenient_embedding;
use crate::error::{CoreError, Result};
use crate::similarity;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compiled-size ceiling for a single keyword pattern.
const KEYWORD_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// One SDG as stored in `sdgs.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct SdgRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_embedding")]
    pub embedding: Option<Vec<f32>>,
}

/// Case-insensitive whole-word matcher for one keyword.
#[derive(Debug, Clone)]
pub enum KeywordMatcher {
    /// Escaped keyword wrapped in word boundaries.
    WholeWord(Regex),
    /// Lowercased keyword, matched as a plain substring when the pattern could not be built.
    Substring(String),
    /// Blank keyword; never matches.
    Never,
}

impl KeywordMatcher {
    pub fn compile(keyword: &str) -> Self {
        Self::compile_with_limit(keyword, KEYWORD_REGEX_SIZE_LIMIT)
    }

    fn compile_with_limit(keyword: &str, size_limit: usize) -> Self {
        let keyword = keyword.trim();
        let (Some(first), Some(last)) = (keyword.chars().next(), keyword.chars().last()) else {
            return KeywordMatcher::Never;
        };

        // `\b` only makes sense next to a word character: "C++" gets a leading
        // boundary but none after the pluses.
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        let pattern = format!(
            "{}{}{}",
            if is_word(first) { r"\b" } else { "" },
            regex::escape(keyword),
            if is_word(last) { r"\b" } else { "" },
        );

        match RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(size_limit)
            .build()
        {
            Ok(re) => KeywordMatcher::WholeWord(re),
            Err(e) => {
                tracing::warn!(keyword, "Keyword pattern rejected, using substring match: {}", e);
                KeywordMatcher::Substring(keyword.to_lowercase())
            }
        }
    }

    /// `lowered` must be `text.to_lowercase()`; it is passed in so one query
    /// lowercases its abstract once for the whole catalog.
    pub fn is_match(&self, text: &str, lowered: &str) -> bool {
        match self {
            KeywordMatcher::WholeWord(re) => re.is_match(text),
            KeywordMatcher::Substring(kw) => lowered.contains(kw.as_str()),
            KeywordMatcher::Never => false,
        }
    }
}

/// A catalog entry with its precomputed norm and compiled keyword matchers.
#[derive(Debug, Clone)]
pub struct SdgEntry {
    pub id: u32,
    pub name: String,
    pub keywords: Vec<String>,
    pub embedding: Option<Vec<f32>>,
    /// 0.0 when there is no embedding.
    pub norm: f64,
    matchers: Vec<KeywordMatcher>,
}

impl SdgEntry {
    pub fn from_record(record: SdgRecord) -> Self {
        let norm = record.embedding.as_deref().map_or(0.0, similarity::norm);
        let matchers = record
            .keywords
            .iter()
            .map(|k| KeywordMatcher::compile(k))
            .collect();
        Self {
            id: record.id,
            name: record.name,
            keywords: record.keywords,
            embedding: record.embedding,
            norm,
            matchers,
        }
    }

    /// Keywords found in `text`, in catalog order.
    pub fn matched_keywords(&self, text: &str, lowered: &str) -> Vec<String> {
        self.keywords
            .iter()
            .zip(&self.matchers)
            .filter(|(_, m)| m.is_match(text, lowered))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

/// The immutable SDG catalog.
#[derive(Debug, Clone, Default)]
pub struct SdgCatalog {
    entries: Vec<SdgEntry>,
}

impl SdgCatalog {
    /// Builds the catalog, compiling keyword matchers once per record.
    pub fn new(records: Vec<SdgRecord>) -> Self {
        Self {
            entries: records.into_iter().map(SdgEntry::from_record).collect(),
        }
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let records: Vec<SdgRecord> = serde_json::from_str(raw)?;
        Ok(Self::new(records))
    }

    /// Load `sdgs.json` from `data_dir`. A missing or unparsable file yields an
    /// empty catalog.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(config::SDGS_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("{}", CoreError::SourceMissing(path));
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = ?path, "SDG catalog unreadable: {}", e);
                return Self::default();
            }
        };
        match Self::from_json(&raw) {
            Ok(catalog) => {
                tracing::info!(
                    sdgs = catalog.len(),
                    with_embedding = catalog.entries.iter().filter(|e| e.embedding.is_some()).count(),
                    "SDG catalog loaded"
                );
                catalog
            }
            Err(e) => {
                tracing::warn!(path = ?path, "SDG catalog invalid: {}", e);
                Self::default()
            }
        }
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[SdgEntry] {
        &self.entries
    }

    /// Number of goals in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lightweight catalog listing for clients (no embeddings).
#[derive(Debug, Clone, Serialize)]
pub struct SdgSummary {
    pub id: u32,
    pub name: String,
    pub keywords: Vec<String>,
}

impl From<&SdgEntry> for SdgSummary {
    fn from(entry: &SdgEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            keywords: entry.keywords.clone(),
        }
    }
}
