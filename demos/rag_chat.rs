//! Retrieval-augmented chat example
//!
//! Answers informational questions from a corpus and chats about everything
//! else. The corpus is either a JSON file written by `build_corpus` or a web
//! page that is fetched, chunked and embedded at startup.
//!
//! Run with:
//!   cargo run --example rag_chat -- chunks.json
//!   cargo run --example rag_chat -- https://go.dev/doc/contribute "Contribution Guide" "Appendix"
//!
//! Requires: PREDICTIONGUARD_TOKEN and COHERE_API_KEY environment variables
//! Logging:  EDGEQUAKE_RAG_LOG=debug

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use edgequake_rag::providers::{CohereProvider, PredictionGuardProvider, TracingProvider};
use edgequake_rag::{
    is_exit_command, CompletionProvider, Embedder, RagAssistant, RagConfig, VectorCorpus,
    WebsiteLoader,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("EDGEQUAKE_RAG_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let source = args
        .next()
        .ok_or("usage: rag_chat <corpus.json | url> [start-marker] [end-marker]")?;
    let start_marker = args.next();
    let end_marker = args.next();

    let config = RagConfig::load()?;

    let embedder = Embedder::new(Arc::new(CohereProvider::from_config(&config.embedding)?));
    let completion: Arc<dyn CompletionProvider> = Arc::new(TracingProvider::new(
        PredictionGuardProvider::from_config(&config.completion)?,
    ));

    let corpus = if source.starts_with("http://") || source.starts_with("https://") {
        let mut loader =
            WebsiteLoader::with_timeout(config.chunking.chunker()?, config.completion.timeout())?;
        if let Some(start) = start_marker {
            loader = loader.start_marker(start);
        }
        if let Some(end) = end_marker {
            loader = loader.end_marker(end);
        }

        println!("Fetching {} ...", source);
        let chunks = loader.load(&source).await?;
        println!("Embedding {} chunks ...", chunks.len());
        embedder.vectorize(chunks).await?
    } else {
        VectorCorpus::load(&source)?
    };

    println!("📚 Corpus ready: {} chunks", corpus.len());
    println!("Type 'exit' to end the conversation.\n");

    let mut assistant = RagAssistant::with_config(completion, embedder, corpus, config.assistant);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("🧑: ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim_end_matches(['\r', '\n']);

        if is_exit_command(input) {
            break;
        }

        let answer = match assistant.respond(input).await {
            Ok(answer) => answer,
            Err(e) => {
                eprintln!("\n❌ {}", e.user_description());
                return Err(e.into());
            }
        };
        println!("\n🤖: {}\n", answer.text);
    }

    Ok(())
}
