//! Fixed-capacity journal vector store.
//!
//! A [`VectorStore`] owns one flat, zero-filled `capacity × dimension` f32 buffer
//! and a parallel `Vec` of [`JournalEntry`] records. Entry `i` always describes the
//! vector at `[i·D, (i+1)·D)`. The store is append-only while ingestion fills it
//! and is shared read-only (`Arc<VectorStore>`) afterwards.

use crate::document::{JournalEntry, JournalMeta, Scorability};
use crate::similarity;
use crate::tokenizer::TokenSet;
use std::collections::HashMap;

/// Outcome of offering one entry to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Stored at this index.
    Admitted(u32),
    /// An entry with the same id is already stored.
    Duplicate,
    /// The store is at capacity.
    Full,
}

/// Fixed-capacity journal store: one flat `capacity × dimension` vector buffer
/// plus the entry records that index into it, filled once and then read-only.
#[derive(Debug)]
pub struct VectorStore {
    dimension: usize,
    capacity: usize,
    vectors: Vec<f32>,
    entries: Vec<JournalEntry>,
    id_to_index: HashMap<String, u32>,
}

impl VectorStore {
    /// Allocates the full vector buffer up front so the memory ceiling is fixed.
    pub fn new(dimension: usize, capacity: usize) -> Self {
        Self {
            dimension,
            capacity,
            vectors: vec![0.0; capacity * dimension],
            entries: Vec::new(),
            id_to_index: HashMap::new(),
        }
    }

    /// Appends an entry. An embedding whose length differs from the store
    /// dimension, or that holds a non-finite component, is ignored and the
    /// entry becomes lexical-only.
    pub fn push(
        &mut self,
        meta: JournalMeta,
        tokens: TokenSet,
        embedding: Option<&[f32]>,
    ) -> Admission {
        if self.entries.len() >= self.capacity {
            return Admission::Full;
        }
        if self.id_to_index.contains_key(&meta.id) {
            return Admission::Duplicate;
        }

        let index = self.entries.len();
        let scorability = match embedding {
            Some(v) if v.len() == self.dimension && v.iter().all(|x| x.is_finite()) => {
                let offset = index * self.dimension;
                self.vectors[offset..offset + self.dimension].copy_from_slice(v);
                Scorability::Semantic {
                    norm: similarity::norm(v),
                }
            }
            _ => Scorability::LexicalOnly,
        };

        self.id_to_index.insert(meta.id.clone(), index as u32);
        self.entries.push(JournalEntry {
            meta,
            tokens,
            scorability,
        });
        Admission::Admitted(index as u32)
    }

    /// Embedding dimension of every vector slot.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of admitted entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entry has been admitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` once `len() == capacity()`.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Entry at `index`, in ingestion order.
    pub fn entry(&self, index: usize) -> Option<&JournalEntry> {
        self.entries.get(index)
    }

    /// Vector slot at `index` (zero-filled for lexical-only entries).
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        if index >= self.entries.len() {
            return None;
        }
        let offset = index * self.dimension;
        Some(&self.vectors[offset..offset + self.dimension])
    }

    /// Looks up an entry by journal id.
    pub fn get(&self, id: &str) -> Option<&JournalEntry> {
        self.id_to_index
            .get(id)
            .and_then(|&i| self.entries.get(i as usize))
    }

    /// All entries in ingestion order.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Entries paired with their vector slots, in ingestion order.
    ///
    /// Walks the flat buffer linearly without allocating.
    pub fn iter(&self) -> impl Iterator<Item = (&JournalEntry, &[f32])> + '_ {
        let live = &self.vectors[..self.entries.len() * self.dimension];
        // chunks_exact panics on 0; a zero-dimension store only ever holds lexical entries.
        let chunk = self.dimension.max(1);
        let empty: &[f32] = &[];
        self.entries.iter().zip(
            live.chunks_exact(chunk)
                .chain(std::iter::repeat(empty))
                .take(self.entries.len()),
        )
    }

    /// Entries whose name or publisher contains `needle` (case-insensitive).
    pub fn find<'a>(&'a self, needle: &str) -> impl Iterator<Item = &'a JournalEntry> + 'a {
        let needle = needle.to_lowercase();
        self.entries.iter().filter(move |e| {
            needle.is_empty()
                || e.meta.name.to_lowercase().contains(&needle)
                || e.meta
                    .publisher
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains(&needle))
        })
    }

    /// Number of entries holding an embedding.
    pub fn semantic_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.scorability.has_embedding())
            .count()
    }

    /// Estimates the memory held by the store in bytes.
    pub fn estimate_memory_bytes(&self) -> usize {
        let mut total = self.vectors.len() * std::mem::size_of::<f32>();
        for entry in &self.entries {
            total += std::mem::size_of::<JournalEntry>();
            total += entry.meta.id.len() + entry.meta.name.len();
            total += [
                &entry.meta.publisher,
                &entry.meta.coverage,
                &entry.meta.scope,
                &entry.meta.link,
                &entry.meta.asjc,
            ]
            .iter()
            .map(|f| f.as_ref().map_or(0, String::len))
            .sum::<usize>();
            total += entry.tokens.estimate_bytes();
        }
        total += self.id_to_index.len() * (std::mem::size_of::<String>() + 4);
        total
    }

    /// Validate internal invariants.
    ///
    /// Checks that the buffer covers the full capacity, that the entry count is
    /// within capacity, and that the id map and entries agree.
    pub fn validate(&self) -> Result<(), String> {
        if self.vectors.len() != self.capacity * self.dimension {
            return Err(format!(
                "vector buffer length {} != capacity({}) * dimension({})",
                self.vectors.len(),
                self.capacity,
                self.dimension
            ));
        }
        if self.entries.len() > self.capacity {
            return Err(format!(
                "entries({}) > capacity({})",
                self.entries.len(),
                self.capacity
            ));
        }
        if self.id_to_index.len() != self.entries.len() {
            return Err(format!(
                "id map({}) != entries({})",
                self.id_to_index.len(),
                self.entries.len()
            ));
        }
        for (id, &index) in &self.id_to_index {
            match self.entries.get(index as usize) {
                Some(entry) if &entry.meta.id == id => {}
                _ => return Err(format!("id '{}' maps to wrong index {}", id, index)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn meta(id: &str) -> JournalMeta {
        JournalMeta {
            id: id.to_string(),
            name: format!("Journal {id}"),
            publisher: None,
            coverage: None,
            scope: None,
            link: None,
            asjc: None,
        }
    }

    #[test]
    fn test_new_store_is_empty_and_preallocated() {
        let store = VectorStore::new(4, 10);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 10);
        assert_eq!(store.dimension(), 4);
        assert!(store.validate().is_ok());
        assert!(store.estimate_memory_bytes() >= 4 * 10 * 4);
    }

    #[test]
    fn test_push_semantic_entry() {
        let mut store = VectorStore::new(2, 4);
        let adm = store.push(meta("a"), TokenSet::default(), Some(&[3.0, 4.0]));
        assert_eq!(adm, Admission::Admitted(0));
        assert_eq!(store.vector(0), Some(&[3.0f32, 4.0][..]));
        let entry = store.entry(0).unwrap();
        assert_eq!(entry.scorability, Scorability::Semantic { norm: 5.0 });
    }

    #[test]
    fn test_push_wrong_dimension_is_lexical() {
        let mut store = VectorStore::new(3, 4);
        store.push(meta("a"), tokenize("ocean science"), Some(&[1.0, 2.0]));
        store.push(meta("b"), TokenSet::default(), None);
        assert_eq!(store.entry(0).unwrap().scorability, Scorability::LexicalOnly);
        assert_eq!(store.entry(1).unwrap().scorability, Scorability::LexicalOnly);
        assert_eq!(store.vector(0), Some(&[0.0f32, 0.0, 0.0][..]));
        assert_eq!(store.semantic_count(), 0);
    }

    #[test]
    fn test_push_duplicate_and_full() {
        let mut store = VectorStore::new(2, 2);
        assert_eq!(store.push(meta("a"), TokenSet::default(), None), Admission::Admitted(0));
        assert_eq!(store.push(meta("a"), TokenSet::default(), None), Admission::Duplicate);
        assert_eq!(store.push(meta("b"), TokenSet::default(), None), Admission::Admitted(1));
        assert!(store.is_full());
        assert_eq!(store.push(meta("c"), TokenSet::default(), None), Admission::Full);
        assert_eq!(store.len(), 2);
        assert!(store.validate().is_ok());
    }

    #[test]
    fn test_get_by_id() {
        let mut store = VectorStore::new(2, 4);
        store.push(meta("a"), TokenSet::default(), None);
        store.push(meta("b"), TokenSet::default(), None);
        assert_eq!(store.get("b").unwrap().meta.name, "Journal b");
        assert!(store.get("z").is_none());
    }

    #[test]
    fn test_iter_pairs_entries_with_vectors() {
        let mut store = VectorStore::new(2, 8);
        store.push(meta("a"), TokenSet::default(), Some(&[1.0, 0.0]));
        store.push(meta("b"), TokenSet::default(), None);
        store.push(meta("c"), TokenSet::default(), Some(&[0.9, 0.1]));
        let pairs: Vec<(&str, Vec<f32>)> = store
            .iter()
            .map(|(e, v)| (e.meta.id.as_str(), v.to_vec()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a", vec![1.0, 0.0]),
                ("b", vec![0.0, 0.0]),
                ("c", vec![0.9, 0.1]),
            ]
        );
    }

    #[test]
    fn test_vector_out_of_range() {
        let store = VectorStore::new(2, 8);
        assert!(store.vector(0).is_none());
    }

    #[test]
    fn test_find_by_name_or_publisher() {
        let mut store = VectorStore::new(2, 8);
        let mut m = meta("a");
        m.name = "Journal of Cleaner Production".into();
        m.publisher = Some("Elsevier".into());
        store.push(m, TokenSet::default(), None);
        let mut m = meta("b");
        m.name = "Nature Energy".into();
        m.publisher = Some("Springer Nature".into());
        store.push(m, TokenSet::default(), None);

        let ids = |q: &str| -> Vec<String> { store.find(q).map(|e| e.meta.id.clone()).collect() };
        assert_eq!(ids("cleaner"), vec!["a"]);
        assert_eq!(ids("SPRINGER"), vec!["b"]);
        assert_eq!(ids(""), vec!["a", "b"]);
        assert!(ids("medicine").is_empty());
    }
}
