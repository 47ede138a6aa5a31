//! Corpus building example
//!
//! Chunks a text file, embeds every chunk, and saves the result as a JSON
//! array of `{chunk, vector}` objects that `rag_chat` can load.
//!
//! Run with: cargo run --example build_corpus -- guide.txt chunks.json
//! Requires: COHERE_API_KEY environment variable

use std::sync::Arc;

use edgequake_rag::providers::CohereProvider;
use edgequake_rag::{Embedder, RagConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("EDGEQUAKE_RAG_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .ok_or("usage: build_corpus <input.txt> [output.json]")?;
    let output = args.next().unwrap_or_else(|| "chunks.json".to_string());

    let config = RagConfig::load()?;
    let chunker = config.chunking.chunker()?;
    let embedder = Embedder::new(Arc::new(CohereProvider::from_config(&config.embedding)?))
        .with_batch_size(config.embedding.batch_size)?;

    let text = std::fs::read_to_string(&input)?;
    let chunks = chunker.chunk(&text);
    println!(
        "Split {} into {} chunks ({} tokens, {} overlap)",
        input,
        chunks.len(),
        chunker.chunk_size(),
        chunker.overlap()
    );

    let corpus = embedder.vectorize(chunks).await?;
    corpus.save(&output)?;

    println!("✨ Wrote {} vectorized chunks to {}", corpus.len(), output);
    Ok(())
}
