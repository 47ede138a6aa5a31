//! In-memory collection of vectorized chunks and its JSON file format.
//!
//! On disk a corpus is a flat JSON array:
//!
//! ```json
//! [
//!   {"chunk": "Go is an open source programming language ...", "vector": [0.12, -0.03]},
//!   {"chunk": "... the contribution guide", "vector": [0.08, 0.41]}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::search::{search, SearchHit};
use crate::traits::Embedding;

/// A chunk of source text paired with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizedChunk {
    pub chunk: String,
    pub vector: Embedding,
}

impl VectorizedChunk {
    pub fn new(chunk: impl Into<String>, vector: Embedding) -> Self {
        Self {
            chunk: chunk.into(),
            vector,
        }
    }
}

/// Ordered, append-only set of vectorized chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorCorpus {
    entries: Vec<VectorizedChunk>,
}

impl VectorCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<VectorizedChunk>) -> Self {
        Self { entries }
    }

    /// Pair chunks with vectors positionally.
    ///
    /// Extra items on either side are dropped; callers are expected to pass
    /// equal-length inputs.
    pub fn from_pairs(chunks: Vec<String>, vectors: Vec<Embedding>) -> Self {
        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| VectorizedChunk { chunk, vector })
            .collect();
        Self { entries }
    }

    pub fn push(&mut self, entry: VectorizedChunk) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VectorizedChunk] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VectorizedChunk> {
        self.entries.iter()
    }

    /// Find the chunk most similar to `query`. See [`crate::search::search`].
    pub fn search(&self, query: &[f64]) -> Result<Option<SearchHit<'_>>> {
        search(&self.entries, query)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a corpus previously written with [`VectorCorpus::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let corpus = Self::from_json(&content)?;
        info!(
            "Loaded {} vectorized chunks from {}",
            corpus.len(),
            path.display()
        );
        Ok(corpus)
    }

    /// Write the corpus as a JSON array, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        debug!("Saved {} vectorized chunks to {}", self.len(), path.display());
        Ok(())
    }
}

impl IntoIterator for VectorCorpus {
    type Item = VectorizedChunk;
    type IntoIter = std::vec::IntoIter<VectorizedChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a VectorCorpus {
    type Item = &'a VectorizedChunk;
    type IntoIter = std::slice::Iter<'a, VectorizedChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<VectorizedChunk> for VectorCorpus {
    fn from_iter<I: IntoIterator<Item = VectorizedChunk>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;

    fn sample() -> VectorCorpus {
        VectorCorpus::from_pairs(
            vec!["alpha".to_string(), "beta".to_string()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
    }

    #[test]
    fn test_json_is_flat_array() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"chunk": "alpha", "vector": [1.0, 0.0]},
                {"chunk": "beta", "vector": [0.0, 1.0]}
            ])
        );
    }

    #[test]
    fn test_from_json_accepts_integer_components() {
        let corpus = VectorCorpus::from_json(r#"[{"chunk": "x", "vector": [1, 0, 2]}]"#).unwrap();
        assert_eq!(corpus.entries()[0].vector, vec![1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            VectorCorpus::from_json(r#"{"chunk": "not an array"}"#),
            Err(RagError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");

        let corpus = sample();
        corpus.save(&path).unwrap();
        let loaded = VectorCorpus::load(&path).unwrap();
        assert_eq!(loaded, corpus);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = VectorCorpus::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(RagError::Io(_))));
    }

    #[test]
    fn test_corpus_search() {
        let corpus = sample();
        let hit = corpus.search(&[0.1, 0.9]).unwrap().unwrap();
        assert_eq!(hit.chunk, "beta");
        assert!(VectorCorpus::new().search(&[1.0]).unwrap().is_none());
    }

    #[test]
    fn test_from_pairs_and_collect() {
        let corpus: VectorCorpus = sample().into_iter().rev().collect();
        let chunks: Vec<&str> = corpus.iter().map(|e| e.chunk.as_str()).collect();
        assert_eq!(chunks, vec!["beta", "alpha"]);
    }
}
