//! Sliding-window text chunker.
//!
//! Tokens are produced by splitting on the literal space character, not on
//! general whitespace: a run of two spaces yields an empty token and newlines
//! stay inside their token. Re-joining a window with single spaces therefore
//! reproduces the original text of that window exactly.
//!
//! ```text
//! "a b c d e f", chunk_size = 3, overlap = 1, step = 2
//!
//!  a b c            chunk 0: tokens 0..3
//!      c d e        chunk 1: tokens 2..5
//!          e f      chunk 2: tokens 4..6 (short, reaches the end)
//! ```

use crate::error::{RagError, Result};

/// Default window length in tokens.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Default number of tokens carried into the next window.
pub const DEFAULT_CHUNK_OVERLAP: usize = 10;

/// Splits text into overlapping, token-bounded chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextChunker {
    /// Create a chunker.
    ///
    /// Fails with `InvalidConfiguration` unless `overlap < chunk_size`; a
    /// step of zero would never advance through the text.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "chunk size must be at least 1 token".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidConfiguration(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Tokens between the starts of consecutive chunks.
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Split `text` into chunks. Empty input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let tokens: Vec<&str> = text.split(' ').collect();
        let mut chunks = Vec::with_capacity(tokens.len() / self.step() + 1);
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(tokens.len());
            chunks.push(tokens[start..end].join(" "));
            if end == tokens.len() {
                break;
            }
            start += self.step();
        }

        chunks
    }
}

/// Chunk `text` with a one-off chunker.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(TextChunker::new(chunk_size, overlap)?.chunk(text))
}
