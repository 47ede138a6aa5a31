//! Cosine similarity and linear best-match search.
//!
//! Vectors of different lengths are compared as if the shorter one were
//! zero-padded: indices present in both contribute to the dot product and
//! both norms, indices present in only one contribute to that vector's norm.
//!
//! The search adopts an entry only when its similarity is strictly greater
//! than the best seen so far, starting from `0.0`. Ties keep the earliest
//! entry, and entries scoring `<= 0.0` can never win, even when they are the
//! only entries in the corpus.

use tracing::debug;

use crate::corpus::VectorizedChunk;
use crate::error::{RagError, Result};

/// Best-matching corpus entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit<'a> {
    /// Position of the entry in the corpus.
    pub index: usize,
    /// Cosine similarity with the query.
    pub score: f64,
    pub chunk: &'a str,
}

/// Cosine similarity of `a` and `b`.
///
/// Fails with `DegenerateVector` when either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    let count = a.len().max(b.len());
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for k in 0..count {
        match (a.get(k), b.get(k)) {
            (Some(x), Some(y)) => {
                dot += x * y;
                norm_a += x * x;
                norm_b += y * y;
            }
            (Some(x), None) => norm_a += x * x,
            (None, Some(y)) => norm_b += y * y,
            (None, None) => unreachable!("index below the longer length"),
        }
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(RagError::DegenerateVector(
            "vectors should not be null (all zeros)".to_string(),
        ));
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Scan `corpus` once and return the entry most similar to `query`.
///
/// Returns `Ok(None)` for an empty corpus or when no entry scores above zero.
/// The first similarity error aborts the scan.
pub fn search<'a>(corpus: &'a [VectorizedChunk], query: &[f64]) -> Result<Option<SearchHit<'a>>> {
    let mut best: Option<SearchHit<'a>> = None;
    let mut max_similarity = 0.0;

    for (index, entry) in corpus.iter().enumerate() {
        let score = cosine_similarity(&entry.vector, query)?;
        if score > max_similarity {
            max_similarity = score;
            best = Some(SearchHit {
                index,
                score,
                chunk: &entry.chunk,
            });
        }
    }

    match &best {
        Some(hit) => debug!(
            "Search over {} chunks: best index {} with similarity {:.4}",
            corpus.len(),
            hit.index,
            hit.score
        ),
        None => debug!("Search over {} chunks found no positive match", corpus.len()),
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn entry(chunk: &str, vector: Vec<f64>) -> VectorizedChunk {
        VectorizedChunk::new(chunk, vector)
    }

    #[test]
    fn test_self_similarity_is_one() {
        for v in [vec![1.0, 2.0, 3.0], vec![-0.5, 0.25], vec![1e-3; 384]] {
            let sim = cosine_similarity(&v, &v).unwrap();
            assert!((sim - 1.0).abs() < EPSILON, "sim={}", sim);
        }
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (vec![1.0, 2.0, 3.0], vec![3.0, -1.0, 0.5]),
            (vec![1.0, 0.0], vec![0.3, 0.7, 0.9]),
            (vec![0.2], vec![0.4, 0.1]),
        ];
        for (a, b) in pairs {
            let ab = cosine_similarity(&a, &b).unwrap();
            let ba = cosine_similarity(&b, &a).unwrap();
            assert!((ab - ba).abs() < EPSILON);
        }
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        let sim = cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]).unwrap();
        assert!((sim + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_unequal_lengths_are_zero_padded() {
        // [1, 0] vs [1, 0, 1]: dot = 1, |a| = 1, |b| = sqrt(2)
        let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 1.0]).unwrap();
        assert!((sim - 1.0 / 2f64.sqrt()).abs() < EPSILON);
    }

    #[test]
    fn test_zero_vector_is_degenerate() {
        assert!(matches!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]),
            Err(RagError::DegenerateVector(_))
        ));
        assert!(matches!(
            cosine_similarity(&[1.0, 2.0], &[]),
            Err(RagError::DegenerateVector(_))
        ));
    }

    #[test]
    fn test_search_empty_corpus() {
        assert_eq!(search(&[], &[1.0, 0.0]).unwrap(), None);
    }

    #[test]
    fn test_search_picks_best_match() {
        let corpus = vec![entry("first", vec![1.0, 0.0]), entry("second", vec![0.0, 1.0])];
        let hit = search(&corpus, &[1.0, 0.0]).unwrap().unwrap();
        assert_eq!(hit.chunk, "first");
        assert_eq!(hit.index, 0);
        assert!((hit.score - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_single_positive_entry_wins_anywhere() {
        for position in 0..4 {
            let mut corpus: Vec<VectorizedChunk> = (0..3)
                .map(|i| entry(&format!("negative {}", i), vec![-1.0, -0.5]))
                .collect();
            corpus.insert(position, entry("positive", vec![0.5, 0.5]));

            let hit = search(&corpus, &[1.0, 1.0]).unwrap().unwrap();
            assert_eq!(hit.chunk, "positive");
            assert_eq!(hit.index, position);
        }
    }

    #[test]
    fn test_non_positive_similarities_never_win() {
        let corpus = vec![entry("orthogonal", vec![0.0, 1.0]), entry("opposite", vec![-1.0, 0.0])];
        assert_eq!(search(&corpus, &[1.0, 0.0]).unwrap(), None);
    }

    #[test]
    fn test_ties_keep_first_entry() {
        let corpus = vec![entry("a", vec![2.0, 0.0]), entry("b", vec![1.0, 0.0])];
        let hit = search(&corpus, &[1.0, 0.0]).unwrap().unwrap();
        assert_eq!(hit.chunk, "a");
    }

    #[test]
    fn test_search_aborts_on_degenerate_entry() {
        let corpus = vec![entry("good", vec![1.0, 0.0]), entry("zero", vec![0.0, 0.0])];
        assert!(matches!(
            search(&corpus, &[1.0, 0.0]),
            Err(RagError::DegenerateVector(_))
        ));
    }
}
