//! Global configuration constants for scopematch.
//!
//! Corpus limits, ranking bounds, scoring weights and server defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI arguments
//! and environment variables in the server's `main.rs`.

use serde::{Deserialize, Serialize};

/// Default embedding dimension (OpenAI `text-embedding-3-small`).
pub const DEFAULT_DIMENSION: usize = 1536;

/// Maximum allowed embedding dimension.
pub const MAX_DIMENSION: usize = 4096;

/// Default capacity of the journal vector store.
///
/// 100k entries × 1536 dims × 4 bytes ≈ 600 MB for the flat vector buffer.
pub const DEFAULT_MAX_ENTRIES: usize = 100_000;

/// Tokens with this many characters or fewer are discarded by the tokenizer.
pub const MIN_TOKEN_CHARS: usize = 3;

/// Lower bound for the number of journals returned per query.
pub const MIN_TOP_K: usize = 1;

/// Upper bound for the number of journals returned per query.
pub const MAX_TOP_K: usize = 20;

/// Number of journals returned when the caller does not ask for a specific `topK`.
pub const DEFAULT_TOP_K: usize = 3;

/// Number of SDGs returned per query, regardless of their scores.
pub const SDG_TOP_N: usize = 3;

/// Weight applied to the SDG cosine similarity.
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.5;

/// Bonus added per SDG keyword found in the abstract.
pub const DEFAULT_KEYWORD_WEIGHT: f64 = 0.1;

/// Streaming corpus file (one JSON record per line).
pub const JOURNALS_JSONL_FILE: &str = "journals.jsonl";

/// Legacy corpus file (one JSON array), used only when the JSONL file is absent.
pub const JOURNALS_JSON_FILE: &str = "journals.json";

/// Exclusion list file (JSON array of journal ids).
pub const EXCLUSIONS_FILE: &str = "exclusions.json";

/// SDG catalog file.
pub const SDGS_FILE: &str = "sdgs.json";

/// Page size for the admin journal listing.
pub const ADMIN_PAGE_SIZE: usize = 50;

/// Maximum abstract length in bytes.
pub const MAX_ABSTRACT_LEN: usize = 100_000;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory holding the corpus, SDG catalog and exclusion list.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default embedding model name.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default base URL of the OpenAI-compatible embedding API.
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com/v1";

/// Timeout for a single embedding request, in seconds.
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 10;

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum HTTP request body size in bytes (1 MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Weights of the SDG hybrid score: `semantic * cosine + keyword * matches`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub keyword: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: DEFAULT_SEMANTIC_WEIGHT,
            keyword: DEFAULT_KEYWORD_WEIGHT,
        }
    }
}

/// Clamp a requested result count into `[MIN_TOP_K, MAX_TOP_K]`.
pub fn clamp_top_k(requested: usize) -> usize {
    requested.clamp(MIN_TOP_K, MAX_TOP_K)
}
