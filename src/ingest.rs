//! Website ingestion: fetch a page, convert it to markdown, and chunk it.
//!
//! ```text
//! GET url ─► HTML ─► markdown ─► slice between markers ─► TextChunker
//! ```
//!
//! Markdown keeps headings and list structure as plain text, which embeds
//! better than raw HTML and reads cleanly when quoted back in a prompt.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::chunker::TextChunker;
use crate::error::{RagError, Result};

/// Keep only the part of `markdown` between two markers.
///
/// - `start`: every occurrence of the marker is removed and only the text
///   after the first occurrence is kept. A start marker that never occurs
///   yields an empty string.
/// - `end`: the text is cut before the first occurrence of the marker.
///
/// Empty markers are ignored.
///
/// ```
/// use edgequake_rag::ingest::slice_between_markers;
///
/// let page = "nav | How to contribute | body text | Footer";
/// assert_eq!(
///     slice_between_markers(page, Some("How to contribute"), Some("Footer")),
///     " | body text | "
/// );
/// ```
pub fn slice_between_markers(markdown: &str, start: Option<&str>, end: Option<&str>) -> String {
    let mut text = match start.filter(|s| !s.is_empty()) {
        Some(start) => markdown.split(start).skip(1).collect::<String>(),
        None => markdown.to_string(),
    };

    if let Some(end) = end.filter(|e| !e.is_empty()) {
        if let Some(pos) = text.find(end) {
            text.truncate(pos);
        }
    }

    text
}

/// Convert an HTML document to markdown.
pub fn html_to_markdown(html: &str) -> String {
    html2md::parse_html(html)
}

/// Loads a web page as a list of chunks.
#[derive(Debug, Clone)]
pub struct WebsiteLoader {
    client: Client,
    chunker: TextChunker,
    start_marker: Option<String>,
    end_marker: Option<String>,
}

impl WebsiteLoader {
    pub fn new(chunker: TextChunker) -> Result<Self> {
        Self::with_timeout(chunker, None)
    }

    pub fn with_timeout(chunker: TextChunker, timeout: Option<Duration>) -> Result<Self> {
        let mut client = Client::builder();
        if let Some(timeout) = timeout {
            client = client.timeout(timeout);
        }
        let client = client.build().map_err(|e| {
            RagError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            chunker,
            start_marker: None,
            end_marker: None,
        })
    }

    /// Keep only the text after this marker.
    pub fn start_marker(mut self, marker: impl Into<String>) -> Self {
        self.start_marker = Some(marker.into());
        self
    }

    /// Drop everything from this marker on.
    pub fn end_marker(mut self, marker: impl Into<String>) -> Self {
        self.end_marker = Some(marker.into());
        self
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    /// Slice and chunk an already-fetched HTML document.
    pub fn chunk_html(&self, html: &str) -> Vec<String> {
        let markdown = html_to_markdown(html);
        let text = slice_between_markers(
            &markdown,
            self.start_marker.as_deref(),
            self.end_marker.as_deref(),
        );
        self.chunker.chunk(&text)
    }

    /// Fetch `url` and return its chunks.
    pub async fn load(&self, url: &str) -> Result<Vec<String>> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::RemoteStatusFailure {
                status: status.as_u16().to_string(),
                message: format!("GET {} failed", url),
            });
        }

        let html = response.text().await?;
        let chunks = self.chunk_html(&html);
        info!("Loaded {} chunks from {}", chunks.len(), url);
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_without_markers() {
        assert_eq!(slice_between_markers("a b c", None, None), "a b c");
        assert_eq!(slice_between_markers("a b c", Some(""), Some("")), "a b c");
    }

    #[test]
    fn test_start_marker_removes_every_occurrence() {
        assert_eq!(
            slice_between_markers("head START one START two", Some("START"), None),
            " one  two"
        );
    }

    #[test]
    fn test_missing_start_marker_yields_empty() {
        assert_eq!(slice_between_markers("no marker here", Some("START"), None), "");
    }

    #[test]
    fn test_end_marker_cuts_at_first_occurrence() {
        assert_eq!(
            slice_between_markers("body END tail END more", None, Some("END")),
            "body "
        );
        assert_eq!(
            slice_between_markers("body only", None, Some("END")),
            "body only"
        );
    }

    #[test]
    fn test_html_to_markdown_keeps_text() {
        let markdown = html_to_markdown("<h1>Contributing</h1><p>Send a change list.</p>");
        assert!(markdown.contains("Contributing"));
        assert!(markdown.contains("Send a change list."));
        assert!(!markdown.contains("<p>"));
    }

    #[test]
    fn test_chunk_html_applies_markers() {
        let chunker = TextChunker::new(3, 1).unwrap();
        let loader = WebsiteLoader::new(chunker)
            .unwrap()
            .start_marker("BEGIN")
            .end_marker("STOP");

        let chunks = loader.chunk_html("<p>skip BEGIN one two three four STOP skipped</p>");
        assert!(!chunks.is_empty());
        let joined = chunks.join(" ");
        assert!(joined.contains("one"));
        assert!(joined.contains("four"));
        assert!(!joined.contains("skip"));
        assert!(!joined.contains("skipped"));
    }
}
